// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 计算两个字符串的相似度百分比
///
/// 基于Levenshtein编辑距离，按较长字符串的长度归一化：
/// `100 - distance / max_len * 100`。完全相同返回100，任一为空返回0。
pub fn string_similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a == 0 || len_b == 0 {
        return 0.0;
    }

    let max_len = len_a.max(len_b) as f64;
    let distance = strsim::levenshtein(a, b) as f64;
    100.0 - (distance / max_len * 100.0)
}
