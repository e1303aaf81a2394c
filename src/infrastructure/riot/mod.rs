// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// Riot接口地址构造
pub mod endpoints;

pub use endpoints::Endpoints;
