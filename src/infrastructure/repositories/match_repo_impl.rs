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

use crate::domain::models::{MatchData, Participant, Player};
use crate::domain::repositories::match_repository::{MatchRepository, RepositoryError};
use crate::infrastructure::database::entities::{matches, participants, summoners};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;

/// 对局仓库实现
pub struct MatchRepositoryImpl {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl MatchRepositoryImpl {
    /// 创建新的对局仓库实例
    ///
    /// # 参数
    ///
    /// * `db` - 数据库连接
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 同一对局中的召唤师按编号去重后批量写入，已存在的更新名称和等级
    async fn upsert_summoners(
        txn: &DatabaseTransaction,
        match_data: &MatchData,
    ) -> Result<(), DbErr> {
        let now = Utc::now();
        let mut unique: HashMap<&str, &Participant> = HashMap::new();
        for participant in &match_data.info.participants {
            if !participant.summoner_id.is_empty() {
                unique.insert(participant.summoner_id.as_str(), participant);
            }
        }
        if unique.is_empty() {
            return Ok(());
        }

        let models = unique.into_values().map(|p| summoners::ActiveModel {
            id: Set(p.summoner_id.clone()),
            name: Set(p.summoner_name.clone()),
            level: Set(p.summoner_level),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        });

        let result = summoners::Entity::insert_many(models)
            .on_conflict(
                OnConflict::column(summoners::Column::Id)
                    .update_columns([
                        summoners::Column::Name,
                        summoners::Column::Level,
                        summoners::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(txn)
            .await;
        tolerate_conflict(result)
    }

    async fn insert_participants(
        txn: &DatabaseTransaction,
        match_data: &MatchData,
    ) -> Result<(), DbErr> {
        let game_id = match_data.info.game_id;
        let models: Vec<_> = match_data
            .info
            .participants
            .iter()
            .map(|p| participants::ActiveModel {
                participant_id: Set(p.participant_id),
                match_id: Set(game_id),
                summoner_id: Set(p.summoner_id.clone()),
                champion_id: Set(p.champion_id),
                team_id: Set(p.team_id),
                role: Set(p.role.clone()),
                lane: Set(p.lane.clone()),
                kills: Set(p.kills),
                deaths: Set(p.deaths),
                assists: Set(p.assists),
                champ_level: Set(p.champ_level),
                total_damage_dealt_to_champions: Set(p.total_damage_dealt_to_champions),
                gold_earned: Set(p.gold_earned),
                win: Set(p.win),
                summoner_spell1_id: Set(p.summoner1_id),
                summoner_spell2_id: Set(p.summoner2_id),
                items: Set(p
                    .items()
                    .iter()
                    .map(|(_, item)| item.to_string())
                    .collect::<Vec<_>>()
                    .join(",")),
            })
            .collect();
        if models.is_empty() {
            return Ok(());
        }

        let result = participants::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    participants::Column::ParticipantId,
                    participants::Column::MatchId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(txn)
            .await;
        tolerate_conflict(result)
    }
}

/// 冲突时不插入的语句在部分后端上报告为 `RecordNotInserted`
fn tolerate_conflict(result: Result<u64, DbErr>) -> Result<(), DbErr> {
    match result {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
        Err(e) => Err(e),
    }
}

#[async_trait]
impl MatchRepository for MatchRepositoryImpl {
    async fn save_match(&self, match_data: &MatchData) -> Result<(), RepositoryError> {
        let info = &match_data.info;
        let model = matches::ActiveModel {
            id: Set(info.game_id),
            match_uid: Set(match_data.metadata.match_id.clone()),
            creation: Set(info.game_creation),
            duration: Set(info.game_duration),
            end_timestamp: Set(info.game_end_timestamp),
            mode: Set(info.game_mode.clone()),
            name: Set(info.game_name.clone()),
            start_timestamp: Set(info.game_start_timestamp),
            game_type: Set(info.game_type.clone()),
            version: Set(info.game_version.clone()),
            map_id: Set(info.map_id),
            platform_id: Set(info.platform_id.clone()),
            queue_id: Set(info.queue_id),
            created_at: Set(Utc::now().into()),
        };

        let txn = self.db.begin().await?;

        tolerate_conflict(
            matches::Entity::insert(model)
                .on_conflict(
                    OnConflict::column(matches::Column::Id)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await,
        )?;
        Self::upsert_summoners(&txn, match_data).await?;
        Self::insert_participants(&txn, match_data).await?;

        txn.commit().await?;
        Ok(())
    }

    async fn latest_crawled_players(&self, limit: u64) -> Result<Vec<Player>, RepositoryError> {
        let models = summoners::Entity::find()
            .order_by_asc(summoners::Column::CreatedAt)
            .order_by_asc(summoners::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await?;

        Ok(models
            .into_iter()
            .map(|m| Player {
                summoner_id: m.id,
                summoner_name: m.name,
                summoner_level: m.level,
                ..Default::default()
            })
            .collect())
    }

    async fn player_names_except(&self, names: &[String]) -> Result<Vec<String>, RepositoryError> {
        let mut query = summoners::Entity::find()
            .select_only()
            .column(summoners::Column::Name);
        if !names.is_empty() {
            query = query.filter(summoners::Column::Name.is_not_in(names.iter().cloned()));
        }

        let names = query.into_tuple::<String>().all(self.db.as_ref()).await?;
        Ok(names)
    }
}

#[cfg(test)]
#[path = "match_repo_impl_test.rs"]
mod tests;
