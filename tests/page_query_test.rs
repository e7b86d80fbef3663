//! Page query integration tests
//!
//! Runs the count + find + decode flow against the in-memory collection:
//! - window arithmetic over a filtered, sorted collection
//! - total agrees with an independent count
//! - projection leaves omitted sections at their zero value
//! - a single undecodable document aborts the page

use bson::{doc, DateTime};
use playerbook::db::schemas::sections::{BagSection, ItemStack};
use playerbook::db::{DocumentCollection, MemoryCollection, PlayerInfo, PlayerSummary};
use playerbook::query::{find_with_page, Filter, PageParam, PageRequest, Projection, SortSpec};
use playerbook::PlayerbookError;

// =============================================================================
// Fixtures
// =============================================================================

fn player(n: i32) -> PlayerInfo {
    let mut player = PlayerInfo::new(PlayerSummary {
        player_id: format!("{}", 1_000_000 + n),
        unique_id: format!("u-{:04}", n),
        user_id: format!("acct-{}", n % 5),
        nickname: format!("Hero{}", n),
        lv: n,
        power: i64::from(n) * 1000,
        area_id: n,
        login_time: Some(DateTime::from_millis(1_700_000_000_000 + i64::from(n) * 60_000)),
        register_time: Some(DateTime::from_millis(1_690_000_000_000 + i64::from(n) * 60_000)),
    });
    player.bag = BagSection {
        version: 1,
        items: vec![ItemStack {
            item_id: 1001,
            count: i64::from(n),
        }],
        capacity: 100,
    };
    player
}

async fn seeded(count: i32) -> MemoryCollection {
    let collection = MemoryCollection::new("player_info");
    for n in 1..=count {
        collection
            .insert(bson::to_document(&player(n)).unwrap())
            .await;
    }
    collection
}

fn area_page(page_num: u64, page_size: u64) -> PageRequest {
    PageRequest::new(Filter::new().gte("area_id", 10), PageParam::new(page_num, page_size))
        .sort(SortSpec::new().asc("area_id"))
        .projection(Projection::fields(PlayerSummary::projected_fields()))
}

// =============================================================================
// Windowing
// =============================================================================

#[tokio::test]
async fn test_second_page_of_filtered_sorted_collection() {
    let collection = seeded(25).await;

    let page = find_with_page(&collection, &area_page(2, 10), PlayerSummary::default)
        .await
        .unwrap();

    assert_eq!(page.total, 16);
    let areas: Vec<i32> = page.list.iter().map(|p| p.area_id).collect();
    assert_eq!(areas, vec![20, 21, 22, 23, 24, 25]);
}

#[tokio::test]
async fn test_pages_never_exceed_page_size_and_cover_every_match() {
    let collection = seeded(25).await;

    let mut seen = Vec::new();
    for page_num in 1..=4 {
        let page = find_with_page(&collection, &area_page(page_num, 5), PlayerSummary::default)
            .await
            .unwrap();
        assert!(page.list.len() <= 5);
        assert_eq!(page.total, 16);
        seen.extend(page.list.into_iter().map(|p| p.area_id));
    }

    assert_eq!(seen, (10..=25).collect::<Vec<_>>());
}

#[tokio::test]
async fn test_total_matches_independent_count() {
    let collection = seeded(25).await;
    let filter = Filter::new().gte("area_id", 5).lt("area_id", 12);

    let request = PageRequest::new(filter.clone(), PageParam::new(1, 3));
    let page = find_with_page(&collection, &request, PlayerSummary::default)
        .await
        .unwrap();

    assert_eq!(page.total, collection.count(&filter).await.unwrap());
    assert_eq!(page.total, 7);
    assert_eq!(page.list.len(), 3);
}

#[tokio::test]
async fn test_nickname_substring_is_case_insensitive() {
    let collection = seeded(25).await;
    let request = PageRequest::new(
        Filter::new().contains("nickname", "hero2"),
        PageParam::new(1, 20),
    )
    .sort(SortSpec::new().asc("area_id"));

    let page = find_with_page(&collection, &request, PlayerSummary::default)
        .await
        .unwrap();

    // Hero2, Hero20..Hero25
    assert_eq!(page.total, 7);
    assert_eq!(page.list[0].nickname, "Hero2");
}

// =============================================================================
// Projection and decoding
// =============================================================================

#[tokio::test]
async fn test_projection_leaves_omitted_sections_zeroed() {
    let collection = seeded(3).await;
    let request = PageRequest::new(Filter::new().eq("area_id", 2), PageParam::new(1, 10))
        .projection(Projection::fields(PlayerSummary::projected_fields()));

    let page = find_with_page(&collection, &request, PlayerInfo::default)
        .await
        .unwrap();

    assert_eq!(page.list.len(), 1);
    let found = &page.list[0];
    assert_eq!(found.summary, player(2).summary);
    assert_eq!(found.bag, BagSection::default());
}

#[tokio::test]
async fn test_full_document_decodes_every_section() {
    let collection = seeded(3).await;
    let request = PageRequest::new(Filter::new().eq("player_id", "1000003"), PageParam::new(1, 1));

    let page = find_with_page(&collection, &request, PlayerInfo::default)
        .await
        .unwrap();

    assert_eq!(page.list, vec![player(3)]);
    assert_eq!(page.list[0].bag.count_of(1001), 3);
}

#[tokio::test]
async fn test_one_bad_document_aborts_the_page() {
    let collection = seeded(5).await;
    collection
        .insert(doc! { "player_id": "broken", "area_id": 99, "lv": "very high" })
        .await;

    let request = PageRequest::new(Filter::new(), PageParam::new(1, 10))
        .sort(SortSpec::new().asc("area_id"));
    let result = find_with_page(&collection, &request, PlayerSummary::default).await;

    match result {
        Err(PlayerbookError::Decode(msg)) => assert!(msg.contains("lv"), "{}", msg),
        other => panic!("expected a decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_repeated_query_is_identical() {
    let collection = seeded(25).await;
    let request = area_page(1, 7);

    let first = find_with_page(&collection, &request, PlayerSummary::default)
        .await
        .unwrap();
    let second = find_with_page(&collection, &request, PlayerSummary::default)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
