// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

pub mod crawl_flow_test;
pub mod seeding_test;
pub mod static_data_test;
pub mod support;
