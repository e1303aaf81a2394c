// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::support::*;
use rankcrawl::utils::errors::CrawlError;
use rankcrawl::workers::Pool;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_crawl_fans_out_to_discovered_player() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();

    route_player(&transport, "P1", &["EUW1_1"]);
    route_player(&transport, "P2", &["EUW1_1"]);
    route_match(
        &transport,
        1,
        match_json(
            1,
            "CLASSIC",
            vec![participant("P1", 22), participant("P2", TARGET_CHAMPION)],
        ),
    );

    let service = crawl_service(transport.clone(), repository.clone());
    let pool = Pool::new(2, 50);
    let mut errors = pool.take_errors().unwrap();

    pool.dispatch(service.crawl_job(seed("P1"), &pool));
    tokio::time::timeout(Duration::from_secs(5), pool.wait_for_completion())
        .await
        .expect("crawl should drain");

    assert!(service.visited().contains("P1"));
    assert!(service.visited().contains("P2"));
    assert_eq!(service.visited().len(), 2);

    let endpoints = endpoints();
    assert_eq!(transport.calls(&endpoints.summoner_by_name("P2")), 1);
    assert_eq!(transport.calls(&endpoints.match_ids("puuid-P2")), 1);
    // both players saw the same match
    assert_eq!(transport.calls(&endpoints.match_detail("EUW1_1")), 2);

    // each crawler of the match saves it, the store keeps one copy
    assert_eq!(repository.save_calls(), 2);
    assert_eq!(repository.saved_ids(), vec![1]);
    assert!(errors.try_recv().is_err());
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_jobs_for_same_player_crawl_once() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();
    route_player(&transport, "Solo", &[]);

    let service = crawl_service(transport.clone(), repository);
    let pool = Pool::new(4, 50);

    for _ in 0..10 {
        pool.dispatch(service.crawl_job(seed("Solo"), &pool));
    }
    pool.wait_for_completion().await;

    let endpoints = endpoints();
    assert_eq!(transport.calls(&endpoints.summoner_by_name("Solo")), 1);
    assert_eq!(transport.calls(&endpoints.match_ids("puuid-Solo")), 1);
    assert_eq!(service.visited().len(), 1);
    pool.close().await;
}

#[tokio::test]
async fn test_rate_limited_response_is_surfaced_without_retry() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();
    let endpoints = endpoints();

    transport.route(endpoints.summoner_by_name("Busy"), 200, profile_json("Busy"));
    transport.route(
        endpoints.match_ids("puuid-Busy"),
        429,
        json!({"status": {"message": "Rate limit exceeded", "status_code": 429}}),
    );

    let service = crawl_service(transport.clone(), repository);
    let pool = Pool::new(1, 10);
    let mut errors = pool.take_errors().unwrap();

    pool.dispatch(service.crawl_job(seed("Busy"), &pool));
    let err = errors.recv().await.unwrap();
    pool.wait_for_completion().await;

    match err.downcast_ref::<CrawlError>() {
        Some(CrawlError::Fetch(fetch)) => {
            assert!(fetch.is_rate_limited());
            assert_eq!(fetch.status(), Some(429));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(transport.calls(&endpoints.match_ids("puuid-Busy")), 1);

    // the failed player stays visited and is not retried
    pool.dispatch(service.crawl_job(seed("Busy"), &pool));
    pool.wait_for_completion().await;
    assert_eq!(transport.calls(&endpoints.match_ids("puuid-Busy")), 1);
    pool.close().await;
}

#[tokio::test]
async fn test_non_ranked_matches_are_skipped() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();

    route_player(&transport, "P1", &["EUW1_5"]);
    route_match(
        &transport,
        5,
        match_json(
            5,
            "ARAM",
            vec![participant("P1", 22), participant("P9", TARGET_CHAMPION)],
        ),
    );

    let service = crawl_service(transport.clone(), repository.clone());
    let pool = Pool::new(2, 10);

    pool.dispatch(service.crawl_job(seed("P1"), &pool));
    pool.wait_for_completion().await;

    assert!(repository.saved_ids().is_empty());
    assert!(!service.visited().contains("P9"));
    assert_eq!(transport.calls(&endpoints().summoner_by_name("P9")), 0);
    pool.close().await;
}

#[tokio::test]
async fn test_only_target_position_is_saved_and_followed() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();

    route_player(&transport, "P1", &["EUW1_8"]);
    route_player(&transport, "Carry", &[]);
    route_match(
        &transport,
        8,
        match_json(
            8,
            "CLASSIC",
            vec![
                participant("P1", 22),
                participant_at("Support", TARGET_CHAMPION, "SUPPORT", "BOTTOM"),
                participant("Carry", 51),
            ],
        ),
    );

    let service = crawl_service(transport.clone(), repository.clone());
    let pool = Pool::new(2, 10);

    pool.dispatch(service.crawl_job(seed("P1"), &pool));
    pool.wait_for_completion().await;

    // target champion played off-position does not count
    assert!(repository.saved_ids().is_empty());
    assert!(service.visited().contains("Carry"));
    assert!(!service.visited().contains("Support"));
    pool.close().await;
}

#[tokio::test]
async fn test_decode_failure_aborts_job() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();
    let endpoints = endpoints();

    transport.route(endpoints.summoner_by_name("Odd"), 200, profile_json("Odd"));
    transport.route(endpoints.match_ids("puuid-Odd"), 200, json!({"not": "a list"}));

    let service = crawl_service(transport.clone(), repository);
    let pool = Pool::new(1, 10);
    let mut errors = pool.take_errors().unwrap();

    pool.dispatch(service.crawl_job(seed("Odd"), &pool));
    let err = errors.recv().await.unwrap();
    assert!(matches!(
        err.downcast_ref::<CrawlError>(),
        Some(CrawlError::Decode(_))
    ));
    pool.wait_for_completion().await;
    pool.close().await;
}

#[tokio::test]
async fn test_recursive_crawl_reaches_whole_component() {
    let transport = StubTransport::new();
    let repository = InMemoryMatchRepository::new();

    // chain P1 -> P2 -> P3 -> P4, each pair sharing one match
    let names = ["P1", "P2", "P3", "P4"];
    for (i, pair) in names.windows(2).enumerate() {
        let game_id = i as i64 + 10;
        route_match(
            &transport,
            game_id,
            match_json(
                game_id,
                "CLASSIC",
                vec![participant(pair[0], 1), participant(pair[1], TARGET_CHAMPION)],
            ),
        );
    }
    route_player(&transport, "P1", &["EUW1_10"]);
    route_player(&transport, "P2", &["EUW1_10", "EUW1_11"]);
    route_player(&transport, "P3", &["EUW1_11", "EUW1_12"]);
    route_player(&transport, "P4", &["EUW1_12"]);

    let service = crawl_service(transport.clone(), repository.clone());
    let pool = Pool::new(1, 50);

    pool.dispatch(service.crawl_job(seed("P1"), &pool));
    tokio::time::timeout(Duration::from_secs(5), pool.wait_for_completion())
        .await
        .expect("crawl should drain");

    assert_eq!(service.visited().len(), 4);
    let mut saved = repository.saved_ids();
    saved.sort_unstable();
    assert_eq!(saved, vec![10, 11, 12]);
    for name in names {
        assert_eq!(
            transport.calls(&endpoints().match_ids(&format!("puuid-{}", name))),
            1
        );
    }
    pool.close().await;
}
