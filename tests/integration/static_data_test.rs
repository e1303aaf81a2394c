// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::support::*;
use rankcrawl::domain::services::StaticDataService;
use rankcrawl::utils::errors::CrawlError;
use serde_json::json;

fn route_catalogue(transport: &StubTransport) {
    let endpoints = endpoints();
    transport.route(endpoints.versions(), 200, json!(["14.2.1", "14.1.1"]));
    transport.route(
        endpoints.champions("14.2.1"),
        200,
        json!({
            "type": "champion",
            "version": "14.2.1",
            "data": {
                "Samira": {"id": "Samira", "key": "360", "name": "Samira", "title": "the Desert Rose",
                           "tags": ["Marksman"], "partype": "None"},
                "Jinx": {"id": "Jinx", "key": "222", "name": "Jinx", "title": "the Loose Cannon",
                         "tags": ["Marksman"], "partype": "Mana"}
            }
        }),
    );
    transport.route(
        endpoints.items("14.2.1"),
        200,
        json!({
            "type": "item",
            "version": "14.2.1",
            "data": {
                "3031": {"name": "Infinity Edge", "gold": {"base": 625, "purchasable": true,
                         "total": 3400, "sell": 2380}, "tags": ["CriticalStrike"]}
            }
        }),
    );
}

#[tokio::test]
async fn test_load_uses_latest_version() {
    let transport = StubTransport::new();
    route_catalogue(&transport);

    let service = StaticDataService::new(fetcher(transport.clone()), endpoints());
    let data = service.load().await.unwrap();

    assert_eq!(data.version, "14.2.1");
    assert_eq!(data.champions.len(), 2);
    assert_eq!(data.items["3031"].gold.total, 3400);
    assert_eq!(data.target_champion_key("samira").unwrap(), 360);
    assert_eq!(transport.calls(&endpoints().champions("14.1.1")), 0);
}

#[tokio::test]
async fn test_empty_version_list_is_an_error() {
    let transport = StubTransport::new();
    transport.route(endpoints().versions(), 200, json!([]));

    let service = StaticDataService::new(fetcher(transport), endpoints());
    assert!(matches!(
        service.load().await,
        Err(CrawlError::EmptyVersionList)
    ));
}

#[tokio::test]
async fn test_unknown_target_champion() {
    let transport = StubTransport::new();
    route_catalogue(&transport);

    let service = StaticDataService::new(fetcher(transport), endpoints());
    let data = service.load().await.unwrap();
    assert!(matches!(
        data.target_champion_key("Teemo"),
        Err(CrawlError::ChampionNotFound(_))
    ));
}
