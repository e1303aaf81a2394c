// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    /// 游戏编号
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// 带平台前缀的对局标识，如 `EUW1_123`
    pub match_uid: String,
    pub creation: i64,
    pub duration: i64,
    pub end_timestamp: i64,
    pub mode: String,
    pub name: String,
    pub start_timestamp: i64,
    #[sea_orm(column_name = "type")]
    pub game_type: String,
    pub version: String,
    pub map_id: i32,
    pub platform_id: String,
    pub queue_id: i32,
    pub created_at: ChronoDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::participants::Entity")]
    Participants,
}

impl Related<super::participants::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Participants.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
