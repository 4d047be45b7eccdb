use addrbook::{
    contact::{ContactDraft, ContactPatch},
    core::store::{ContactStore, StoreError, StoreSnapshot},
    types::SearchField,
};

fn draft(first: &str, last: &str, city: &str, state: &str) -> ContactDraft {
    ContactDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        address: "1 Main St".to_string(),
        city: city.to_string(),
        state: state.to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone_number: 5_550_100,
        zip: "02101".to_string(),
    }
}

fn assert_indices_consistent(store: &ContactStore) {
    assert_eq!(store.index_total(SearchField::City), store.len());
    assert_eq!(store.index_total(SearchField::State), store.len());
    for c in store.list() {
        assert!(store.search_by_city(c.city()).contains(&c));
        assert!(store.search_by_state(c.state()).contains(&c));
    }
}

#[test]
fn duplicate_name_is_rejected_case_insensitively() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();

    let err = store.add(draft("ANN", "lee", "Austin", "TX")).unwrap_err();
    assert_eq!(
        err,
        StoreError::DuplicateIdentity {
            first_name: "ANN".to_string(),
            last_name: "lee".to_string(),
        }
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.count_by_city("austin"), 0);
    assert_eq!(store.find_by_name("ann", "LEE").unwrap().city(), "Boston");
    assert_indices_consistent(&store);
}

#[test]
fn add_then_delete_restores_empty_indices() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();
    store.add(draft("Bo", "Diaz", "Boston", "MA")).unwrap();

    assert!(store.delete("bo", "DIAZ"));
    assert_eq!(store.len(), 1);
    assert_eq!(store.count_by_city("boston"), 1);

    assert!(store.delete("Ann", "Lee"));
    assert!(store.is_empty());
    assert!(store.index_keys(SearchField::City).is_empty());
    assert!(store.index_keys(SearchField::State).is_empty());
    assert!(!store.delete("Ann", "Lee"));
}

#[test]
fn city_search_ignores_case() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();

    let hits = store.search_by_city("BOSTON");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].first_name(), "Ann");
    assert_eq!(store.count_by_state("ma"), 1);
    assert!(store.search_by_state("CA").is_empty());
    assert_eq!(store.count_by_city("Nowhere"), 0);
}

#[test]
fn update_moves_contact_between_buckets() {
    let mut store = ContactStore::new();
    store.add(draft("Sam", "Kim", "Reno", "NV")).unwrap();

    let updated = store
        .update(
            "sam",
            "kim",
            ContactPatch {
                city: Some("Tahoe".to_string()),
                state: Some("CA".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.city(), "Tahoe");

    assert!(store.search_by_city("reno").is_empty());
    assert_eq!(store.count_by_city("reno"), 0);
    assert_eq!(store.search_by_city("tahoe").len(), 1);
    assert_eq!(store.count_by_state("nv"), 0);
    assert_eq!(store.count_by_state("ca"), 1);
    assert_eq!(store.index_keys(SearchField::City), vec!["tahoe"]);
    assert_indices_consistent(&store);
}

#[test]
fn blank_patch_fields_leave_values_unchanged() {
    let mut store = ContactStore::new();
    store.add(draft("Sam", "Kim", "Reno", "NV")).unwrap();

    store
        .update(
            "Sam",
            "Kim",
            ContactPatch {
                city: Some("   ".to_string()),
                email: Some(String::new()),
                phone_number: Some(7_770_000),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    let c = store.find_by_name("sam", "kim").unwrap();
    assert_eq!(c.city(), "Reno");
    assert_eq!(c.email(), "sam@example.com");
    assert_eq!(c.phone_number(), 7_770_000);
    assert_eq!(store.count_by_city("reno"), 1);
}

#[test]
fn update_of_missing_contact_reports_not_found() {
    let mut store = ContactStore::new();
    let err = store
        .update("No", "One", ContactPatch::default())
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn rename_onto_existing_contact_is_rejected() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();
    store.add(draft("Bo", "Diaz", "Austin", "TX")).unwrap();

    let err = store
        .update(
            "Bo",
            "Diaz",
            ContactPatch {
                first_name: Some("ann".to_string()),
                last_name: Some("LEE".to_string()),
                city: Some("Boston".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateIdentity { .. }));

    let bo = store.find_by_name("bo", "diaz").unwrap();
    assert_eq!(bo.city(), "Austin");
    assert_eq!(store.count_by_city("boston"), 1);
    assert_indices_consistent(&store);
}

#[test]
fn rename_rekeys_identity() {
    let mut store = ContactStore::new();
    store.add(draft("Bo", "Diaz", "Austin", "TX")).unwrap();

    store
        .update(
            "bo",
            "diaz",
            ContactPatch {
                first_name: Some("Bob".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();

    assert!(store.find_by_name("bo", "diaz").is_none());
    assert_eq!(store.find_by_name("BOB", "Diaz").unwrap().first_name(), "Bob");

    // Changing only the letter case keeps the same identity.
    store
        .update(
            "bob",
            "diaz",
            ContactPatch {
                last_name: Some("DIAZ".to_string()),
                ..ContactPatch::default()
            },
        )
        .unwrap();
    assert_eq!(store.find_by_name("bob", "diaz").unwrap().last_name(), "DIAZ");
    assert_eq!(store.len(), 1);
}

#[test]
fn sort_orders_by_first_then_last_name() {
    let mut store = ContactStore::new();
    store.add(draft("Bob", "Z", "Austin", "TX")).unwrap();
    store.add(draft("Amy", "B", "Austin", "TX")).unwrap();
    store.add(draft("Amy", "A", "Austin", "TX")).unwrap();

    store.sort_by_name();

    let names: Vec<_> = store
        .list()
        .into_iter()
        .map(|c| format!("{}/{}", c.first_name(), c.last_name()))
        .collect();
    assert_eq!(names, vec!["Amy/A", "Amy/B", "Bob/Z"]);
    assert_eq!(store.count_by_city("austin"), 3);
}

#[test]
fn sort_is_case_sensitive() {
    let mut store = ContactStore::new();
    store.add(draft("amy", "A", "Austin", "TX")).unwrap();
    store.add(draft("Zed", "A", "Austin", "TX")).unwrap();

    store.sort_by_name();

    assert_eq!(store.list()[0].first_name(), "Zed");
}

#[test]
fn snapshot_rebuilds_indices() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();
    store.add(draft("Bo", "Diaz", "Austin", "TX")).unwrap();

    let json = serde_json::to_string(&store.export_snapshot()).unwrap();
    let snapshot: StoreSnapshot = serde_json::from_str(&json).unwrap();
    let restored = ContactStore::from_snapshot(snapshot).unwrap();

    assert_eq!(restored.list_cloned(), store.list_cloned());
    assert_eq!(restored.count_by_city("BOSTON"), 1);
    assert_indices_consistent(&restored);
}

#[test]
fn snapshot_with_duplicate_names_is_rejected() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();
    let mut snapshot = store.export_snapshot();
    snapshot.contacts.push(snapshot.contacts[0].clone());

    assert!(matches!(
        ContactStore::from_snapshot(snapshot),
        Err(StoreError::DuplicateIdentity { .. })
    ));
}

#[test]
fn display_lists_contacts_line_by_line() {
    let mut store = ContactStore::new();
    store.add(draft("Ann", "Lee", "Boston", "MA")).unwrap();
    store.add(draft("Bo", "Diaz", "Austin", "TX")).unwrap();

    let text = store.to_string();
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Ann Lee"));
    assert!(lines[1].contains("Austin"));
}

#[test]
fn all_blank_patch_is_a_no_op() {
    let mut store = ContactStore::new();
    store.add(draft("Sam", "Kim", "Reno", "NV")).unwrap();

    let unchanged = store
        .update(
            "sam",
            "kim",
            ContactPatch {
                first_name: Some(" ".to_string()),
                city: Some(String::new()),
                ..ContactPatch::default()
            },
        )
        .unwrap();
    assert_eq!(unchanged.first_name(), "Sam");
    assert_eq!(unchanged.city(), "Reno");
    assert_eq!(store.count_by_city("reno"), 1);
    assert_indices_consistent(&store);
}

#[test]
fn ids_follow_list_order() {
    let mut store = ContactStore::new();
    let bob = store.add(draft("Bob", "Z", "Austin", "TX")).unwrap();
    let amy = store.add(draft("Amy", "A", "Austin", "TX")).unwrap();
    assert_eq!(store.ordered_ids(), &[bob, amy]);
    assert_eq!(store.get(amy).unwrap().first_name(), "Amy");

    store.sort_by_name();
    assert_eq!(store.ordered_ids(), &[amy, bob]);

    assert!(store.delete("bob", "z"));
    assert!(store.get(bob).is_none());
    assert_eq!(store.ordered_ids(), &[amy]);
}
