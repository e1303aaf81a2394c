// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 提供领域层抽象的技术实现：
/// - 数据库（database）：连接、表结构初始化和实体映射
/// - 指标（metrics）：Prometheus指标导出
/// - 仓库实现（repositories）：领域仓库接口的数据库实现
/// - Riot接口（riot）：接口地址构造
pub mod database;
pub mod metrics;
pub mod repositories;
pub mod riot;
