// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::support::*;
use serde_json::json;

#[tokio::test]
async fn test_seeds_from_challenger_league_when_database_is_empty() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();
    transport.route(
        endpoints().challenger_entries(),
        200,
        json!([
            {"summonerId": "id-A", "summonerName": "A", "leaguePoints": 1500, "wins": 10, "losses": 2},
            {"summonerId": "id-B", "summonerName": "B", "leaguePoints": 1400, "wins": 9, "losses": 3},
        ]),
    );

    let service = crawl_service(transport.clone(), repository);
    let seeds = service.seed_players(200).await.unwrap();

    let names: Vec<_> = seeds.iter().map(|p| p.summoner_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(seeds[0].league_points, 1500);
    assert!(seeds.iter().all(|p| p.needs_profile()));
    assert!(service.visited().is_empty());
}

#[tokio::test]
async fn test_seeds_from_stored_players_and_flags_the_rest() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::with_players(&["A", "B", "C", "D"]);

    let service = crawl_service(transport.clone(), repository);
    let seeds = service.seed_players(2).await.unwrap();

    let names: Vec<_> = seeds.iter().map(|p| p.summoner_name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(!service.visited().contains("A"));
    assert!(!service.visited().contains("B"));
    assert!(service.visited().contains("C"));
    assert!(service.visited().contains("D"));
    assert_eq!(transport.total_calls(), 0);
}

#[tokio::test]
async fn test_challenger_failure_is_reported() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();
    transport.route(endpoints().challenger_entries(), 403, json!({"status": 403}));

    let service = crawl_service(transport, repository);
    assert!(service.seed_players(200).await.is_err());
}
