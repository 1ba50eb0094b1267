//! Integration tests for the lifecycle log and its projections.
//!
//! Tests: EventDraft → EventStore → StateProjector
//!
//! Verifies:
//! - Appends respect per-serial chronology (also under concurrency)
//! - Latest-wins with same-day tie-break on event_id
//! - History, catalog and delete behave as one consistent log

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    use assettrack_core::{DomainError, EventId, SerialNumber};
    use assettrack_events::{EventDraft, latest_of};

    use crate::event_store::{EventStore, EventStoreError, InMemoryEventStore};
    use crate::projections::{CurrentState, StateProjector};

    fn setup() -> StateProjector<Arc<InMemoryEventStore>> {
        StateProjector::new(Arc::new(InMemoryEventStore::new()))
    }

    fn serial(raw: &str) -> SerialNumber {
        SerialNumber::parse(raw).unwrap()
    }

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
    }

    fn draft(serial: &str, event_date: &str, status: &str) -> EventDraft {
        EventDraft {
            serial_number: serial.to_string(),
            event_date: event_date.to_string(),
            status: status.to_string(),
            current_name: format!("{status}-host"),
            renamed_from: "N/A".to_string(),
            renamed_to: "N/A".to_string(),
            manufacture: "Dell".to_string(),
            model: "Latitude 5440".to_string(),
            description: format!("{status} on {event_date}"),
        }
    }

    #[tokio::test]
    async fn asset_desk_scenario() {
        let projector = setup();
        let store = projector.store();

        let first = store
            .append_draft(draft("ab-100", "2023-01-10", "Assigned"))
            .await
            .unwrap();
        assert_eq!(first.event_id, EventId::new(1));

        let err = store
            .append_draft(draft("ab-100", "2023-01-05", "Redeploy"))
            .await
            .unwrap_err();
        match &err {
            EventStoreError::Domain(DomainError::Ordering { attempted, latest }) => {
                assert_eq!(*attempted, date("2023-01-05"));
                assert_eq!(*latest, date("2023-01-10"));
            }
            other => panic!("expected ordering error, got {other:?}"),
        }
        assert!(err.to_string().contains("2023-01-05"));
        assert!(err.to_string().contains("2023-01-10"));

        let second = store
            .append_draft(draft("ab-100", "2023-02-01", "Redeploy"))
            .await
            .unwrap();
        assert_eq!(second.event_id, EventId::new(2));

        let state = projector.current_state(&serial("ab-100")).await.unwrap();
        assert_eq!(state.current_status, "Redeploy");
        assert_eq!(state.last_event_date, date("2023-02-01"));

        let history = store.history(&serial("ab-100")).await.unwrap();
        let ids: Vec<u64> = history.iter().map(|e| e.event_id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn first_event_is_unconstrained() {
        let projector = setup();
        let store = projector.store();
        store.append_draft(draft("new-1", "2030-12-31", "Assigned")).await.unwrap();
        // A different serial is independent of the first one's dates.
        store.append_draft(draft("new-2", "1990-01-01", "Assigned")).await.unwrap();
        assert_eq!(projector.catalog().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn latest_wins_with_same_day_tie_break() {
        let projector = setup();
        let store = projector.store();

        store.append_draft(draft("tb-1", "2021-01-01", "Assigned")).await.unwrap();
        store.append_draft(draft("tb-1", "2021-06-01", "Returned")).await.unwrap();
        let third = store
            .append_draft(draft("tb-1", "2021-06-01", "Redeploy"))
            .await
            .unwrap();

        let latest = store.latest(&serial("tb-1")).await.unwrap();
        assert_eq!(latest, third);

        let state = projector.current_state(&serial("tb-1")).await.unwrap();
        assert_eq!(state, CurrentState::from(&third));

        let catalog = projector.catalog().await.unwrap();
        assert_eq!(catalog, vec![CurrentState::from(&third)]);
    }

    #[tokio::test]
    async fn history_is_complete_and_ordered() {
        let projector = setup();
        let store = projector.store();

        let mut appended = Vec::new();
        for (d, s) in [
            ("2020-01-01", "Assigned"),
            ("2020-01-01", "Renamed"),
            ("2020-03-15", "Returned"),
            ("2020-09-30", "Redeploy"),
            ("2021-02-01", "Disposal"),
        ] {
            appended.push(store.append_draft(draft("h-1", d, s)).await.unwrap());
        }

        let history = store.history(&serial("h-1")).await.unwrap();
        assert_eq!(history, appended);

        let view = projector.full_view(&serial("h-1")).await.unwrap();
        assert_eq!(view.total_events, 5);
        assert_eq!(view.history, appended);
        assert_eq!(store.count_events(&serial("h-1")).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn serial_spellings_share_one_stream() {
        let projector = setup();
        let store = projector.store();

        store.append_draft(draft(" ab12 ", "2022-01-01", "Assigned")).await.unwrap();
        store.append_draft(draft("AB12", "2022-02-01", "Returned")).await.unwrap();
        store.append_draft(draft("ab12", "2022-03-01", "Redeploy")).await.unwrap();

        let history = store.history(&serial("Ab12")).await.unwrap();
        assert_eq!(history.len(), 3);
        assert!(history.iter().all(|e| e.serial_number.as_str() == "AB12"));
        assert_eq!(projector.catalog().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_cascades_fully() {
        let projector = setup();
        let store = projector.store();

        store.append_draft(draft("del-1", "2022-01-01", "Assigned")).await.unwrap();
        store.append_draft(draft("del-1", "2022-02-01", "Disposal")).await.unwrap();
        store.append_draft(draft("keep-1", "2022-01-01", "Assigned")).await.unwrap();

        assert_eq!(store.delete_all(&serial("del-1")).await.unwrap(), 2);

        assert!(store.history(&serial("del-1")).await.unwrap_err().is_not_found());
        assert!(store.latest(&serial("del-1")).await.unwrap_err().is_not_found());
        assert!(store.delete_all(&serial("del-1")).await.unwrap_err().is_not_found());

        let catalog = projector.catalog().await.unwrap();
        let serials: Vec<&str> = catalog.iter().map(|c| c.serial_number.as_str()).collect();
        assert_eq!(serials, vec!["KEEP-1"]);
    }

    #[tokio::test]
    async fn catalog_rows_equal_current_state() {
        let projector = setup();
        let store = projector.store();

        for (s, d, st) in [
            ("c-3", "2022-01-01", "Assigned"),
            ("c-1", "2022-01-01", "Assigned"),
            ("c-1", "2022-04-01", "Returned"),
            ("c-2", "2022-02-01", "Assigned"),
            ("c-3", "2022-02-01", "Disposal"),
        ] {
            store.append_draft(draft(s, d, st)).await.unwrap();
        }

        let catalog = projector.catalog().await.unwrap();
        assert_eq!(catalog.len(), 3);
        for row in &catalog {
            let state = projector.current_state(&row.serial_number).await.unwrap();
            assert_eq!(row, &state);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_serial_in_order() {
        let store = Arc::new(InMemoryEventStore::new());

        let mut handles = Vec::new();
        for i in 0..64u64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                // Dates deliberately shuffled so many appends must be rejected.
                let day = date("2024-01-01") + Days::new((i * 37) % 50);
                store
                    .append_draft(draft("race-1", &day.to_string(), "Assigned"))
                    .await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(EventStoreError::Domain(DomainError::Ordering { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        let history = store.history(&serial("race-1")).await.unwrap();
        assert_eq!(history.len(), accepted);
        // In id order (append order) the dates never go backwards.
        let mut by_id = history.clone();
        by_id.sort_by_key(|e| e.event_id);
        assert!(by_id.windows(2).all(|w| w[0].event_date <= w[1].event_date));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of appends, accepted events never go back in
        /// time, rejections leave the log untouched, and the store's latest always
        /// equals the maximum of its full history.
        #[test]
        fn append_ordering_invariant(offsets in prop::collection::vec(0u64..30, 1..25)) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = InMemoryEventStore::new();
                let key = serial("prop-1");
                let mut last_accepted: Option<NaiveDate> = None;

                for offset in offsets {
                    let day = date("2022-01-01") + Days::new(offset);
                    let before = store.count_events(&key).await.unwrap();
                    match store.append_draft(draft("prop-1", &day.to_string(), "Assigned")).await {
                        Ok(stored) => {
                            if let Some(prev) = last_accepted {
                                prop_assert!(stored.event_date >= prev);
                            }
                            last_accepted = Some(stored.event_date);
                        }
                        Err(EventStoreError::Domain(DomainError::Ordering { latest, .. })) => {
                            prop_assert_eq!(Some(latest), last_accepted);
                            prop_assert_eq!(store.count_events(&key).await.unwrap(), before);
                        }
                        Err(other) => prop_assert!(false, "unexpected error: {:?}", other),
                    }

                    let history = store.history(&key).await.unwrap();
                    let latest = store.latest(&key).await.unwrap();
                    prop_assert_eq!(latest_of(&history), Some(&latest));
                }
                Ok(())
            })?;
        }
    }
}
