// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含玩家和对局模型、仓库接口以及爬取服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP传输、速率限制和限流请求
pub mod engines;

/// 基础设施模块
///
/// 提供数据库、指标导出和接口地址等外部集成
pub mod infrastructure;

/// 队列模块
///
/// 实现任务类型和有界任务队列
pub mod queue;

/// 工具模块
///
/// 提供错误类型、日志初始化和字符串相似度
pub mod utils;

/// 工作器模块
///
/// 实现工作器和工作池
pub mod workers;
