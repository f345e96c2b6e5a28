//! Integration tests for schema editing through a versioned store.

use formconfig_admin::editor::{self, FormTypeSpec, MoveDirection};
use formconfig_admin::store::{apply, ConfigStore, InMemoryConfigStore};
use formconfig_core::{FormConfigError, SchemaError};
use formconfig_forms::seed::default_configuration;
use formconfig_forms::{Field, FieldType, FormConfiguration};

// ── Helpers ─────────────────────────────────────────────────────────

type Step<'a> =
    Box<dyn Fn(&mut FormConfiguration) -> Result<(), SchemaError> + Send + Sync + 'a>;

fn assert_contiguous(config: &FormConfiguration) {
    for (i, form_type) in config.form_types.iter().enumerate() {
        assert_eq!(form_type.order as usize, i);
        for (j, field) in form_type.fields.iter().enumerate() {
            assert_eq!(field.order as usize, j);
        }
    }
}

async fn first_form_type_id(store: &InMemoryConfigStore) -> String {
    store.load().await.unwrap().form_types[0].id.clone()
}

// ═════════════════════════════════════════════════════════════════════
// 1. Orders stay contiguous across a sequence of edits
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_orders_contiguous_after_every_edit() {
    let store = InMemoryConfigStore::new(default_configuration());
    let id = first_form_type_id(&store).await;

    let steps: [Step<'_>; 7] = [
        Box::new(|c: &mut FormConfiguration| {
            let zip = Field::new("zip", "Zip", FieldType::Text);
            editor::add_field(c, &id, zip).map(drop)
        }),
        Box::new(|c: &mut FormConfiguration| {
            editor::move_field(c, &id, 0, MoveDirection::Down).map(drop)
        }),
        Box::new(|c: &mut FormConfiguration| editor::delete_field(c, &id, 3).map(drop)),
        Box::new(|c: &mut FormConfiguration| {
            editor::move_field(c, &id, 5, MoveDirection::Up).map(drop)
        }),
        Box::new(|c: &mut FormConfiguration| {
            let spec = FormTypeSpec {
                name: "industrial".into(),
                label: "Industrial".into(),
                is_active: true,
                ..FormTypeSpec::default()
            };
            editor::add_form_type(c, spec).map(drop)
        }),
        Box::new(|c: &mut FormConfiguration| {
            editor::move_form_type(c, &id, MoveDirection::Down).map(drop)
        }),
        Box::new(|c: &mut FormConfiguration| editor::delete_field(c, &id, 0).map(drop)),
    ];

    for (i, step) in steps.iter().enumerate() {
        let (_, config) = apply(&store, None, |c| Ok(step(c)?)).await.unwrap();
        assert_eq!(config.version, i as u64 + 1);
        assert_contiguous(&config);
    }
}

// ═════════════════════════════════════════════════════════════════════
// 2. Stale writes
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_if_match_on_stale_version() {
    let store = InMemoryConfigStore::new(default_configuration());
    let id = first_form_type_id(&store).await;
    let seen = store.load().await.unwrap().version;

    apply(&store, Some(seen), |c| Ok(editor::toggle_active(c, &id)?))
        .await
        .unwrap();

    let err = apply(&store, Some(seen), |c| Ok(editor::toggle_active(c, &id)?))
        .await
        .unwrap_err();
    assert!(matches!(err, FormConfigError::Conflict(_)));
    assert!(!store.load().await.unwrap().form_types[0].is_active);
}

// ═════════════════════════════════════════════════════════════════════
// 3. Rejected edits are not committed
// ═════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_rejected_field_not_committed() {
    let store = InMemoryConfigStore::new(default_configuration());
    let id = first_form_type_id(&store).await;

    let err = apply(&store, None, |c| {
        Ok(editor::add_field(
            c,
            &id,
            Field::new("kind", "Kind", FieldType::Radio),
        )?)
    })
    .await
    .unwrap_err();
    assert_eq!(err.status_code(), 400);
    assert!(matches!(
        err,
        FormConfigError::Schema(SchemaError::MissingOptions(_))
    ));

    let config = store.load().await.unwrap();
    assert_eq!(config.version, 0);
    assert!(config.form_types[0].get_field("kind").is_none());
}

#[tokio::test]
async fn test_unknown_form_type_is_not_found() {
    let store = InMemoryConfigStore::new(default_configuration());
    let err = apply(&store, None, |c| Ok(editor::delete_form_type(c, "missing")?))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
