//! Tests for the client-side contract: validation, session handling,
//! the API envelope rules, and the mutate-then-refresh flow.
//! HTTP is replaced by a recording fake transport; nothing here touches
//! the network or a real config directory.

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::path::PathBuf;
    use std::rc::Rc;

    use serde_json::{Map, Value, json};
    use tempfile::TempDir;

    use crate::api::{
        ApiClient, ApiError, ApiRequest, ApiResult, ApiTransport, Body, Method, RawResponse,
        parse_session,
    };
    use crate::commands::crud::{delete_entity, submit_entity};
    use crate::commands::dashboard::bar_width;
    use crate::entities::{self, EntityKey, leftover};
    use crate::forms::{FieldKind, FieldSpec, Lookup, validate_field};
    use crate::model::{Role, Session, value_i64};
    use crate::query::{DataSource, Queries, placeholder_stats};
    use crate::session::{AppContext, AppSettings, SessionStore};

    /// Scripted transport: canned responses per (method, path), plus a log
    /// of everything that was sent.
    #[derive(Default)]
    struct FakeTransport {
        routes: RefCell<Vec<(Method, String, RawResponse)>>,
        log: RefCell<Vec<ApiRequest>>,
    }

    impl FakeTransport {
        fn new() -> Rc<Self> {
            Rc::new(FakeTransport::default())
        }

        fn route(&self, method: Method, path: &str, status: u16, body: &str) {
            self.routes.borrow_mut().push((
                method,
                path.to_string(),
                RawResponse {
                    status,
                    body: body.to_string(),
                },
            ));
        }

        fn requests(&self) -> Vec<(Method, String)> {
            self.log
                .borrow()
                .iter()
                .map(|request| (request.method, request.path.clone()))
                .collect()
        }

        fn count(&self, method: Method, path: &str) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|request| request.method == method && request.path == path)
                .count()
        }

        fn body_at(&self, index: usize) -> Body {
            self.log.borrow()[index].body.clone()
        }
    }

    impl ApiTransport for Rc<FakeTransport> {
        fn send(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
            self.log.borrow_mut().push(request.clone());
            let routes = self.routes.borrow();
            routes
                .iter()
                .find(|(method, path, _)| *method == request.method && *path == request.path)
                .map(|(_, _, response)| response.clone())
                .ok_or_else(|| {
                    ApiError::Network(format!(
                        "no route for {} {}",
                        request.method.as_str(),
                        request.path
                    ))
                })
        }
    }

    fn client_with(transport: &Rc<FakeTransport>) -> ApiClient {
        ApiClient::new(Box::new(Rc::clone(transport)))
    }

    fn spec(label: &'static str, kind: FieldKind, required: bool) -> FieldSpec {
        FieldSpec {
            key: "field",
            label,
            kind,
            required,
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().expect("JSON object").clone()
    }

    fn admin_session() -> Session {
        Session {
            id: 1,
            username: "bob".to_string(),
            role: Some("admin".to_string()),
            photo: Some("p.png".to_string()),
        }
    }

    // ==========================================
    // Field validation
    // ==========================================

    #[test]
    fn test_required_field_blocks_empty_input() {
        let name = spec("Project name", FieldKind::Text, true);
        assert_eq!(
            validate_field(&name, "   "),
            Err("Project name is required.".to_string())
        );
        assert_eq!(
            validate_field(&name, "Villa Nordia"),
            Ok(Some(json!("Villa Nordia")))
        );
    }

    #[test]
    fn test_email_validation_message() {
        let email = spec("Email", FieldKind::Email, true);
        // A missing email reads as an invalid one, not as a generic blank.
        assert_eq!(
            validate_field(&email, ""),
            Err("Valid email required.".to_string())
        );
        assert_eq!(
            validate_field(&email, "not-an-email"),
            Err("Valid email required.".to_string())
        );
        assert_eq!(
            validate_field(&email, "ana@consty.dev"),
            Ok(Some(json!("ana@consty.dev")))
        );
    }

    #[test]
    fn test_phone_validation_message() {
        let phone = spec("Phone", FieldKind::Phone, true);
        assert_eq!(
            validate_field(&phone, "call me"),
            Err("Valid phone number required.".to_string())
        );
        assert_eq!(
            validate_field(&phone, "+355 69 123 4567"),
            Ok(Some(json!("+355 69 123 4567")))
        );
    }

    #[test]
    fn test_money_rejects_negative_and_garbage() {
        let budget = spec("Budget", FieldKind::Money, true);
        assert_eq!(
            validate_field(&budget, "-5"),
            Err("Budget must be a non-negative number.".to_string())
        );
        assert_eq!(
            validate_field(&budget, "lots"),
            Err("Budget must be a non-negative number.".to_string())
        );
        assert_eq!(validate_field(&budget, "1200.50"), Ok(Some(json!(1200.5))));
    }

    #[test]
    fn test_count_rejects_fractions_and_negatives() {
        let quantity = spec("Quantity", FieldKind::Count, true);
        assert_eq!(
            validate_field(&quantity, "3.5"),
            Err("Quantity must be a non-negative whole number.".to_string())
        );
        assert_eq!(
            validate_field(&quantity, "-1"),
            Err("Quantity must be a non-negative whole number.".to_string())
        );
        assert_eq!(validate_field(&quantity, "7"), Ok(Some(json!(7))));
    }

    #[test]
    fn test_date_validation() {
        let deadline = spec("Deadline", FieldKind::Date, true);
        assert_eq!(
            validate_field(&deadline, "2025-13-40"),
            Err("Valid date required.".to_string())
        );
        assert_eq!(
            validate_field(&deadline, "13/01/2025"),
            Err("Valid date required.".to_string())
        );
        assert_eq!(
            validate_field(&deadline, "2025-03-01"),
            Ok(Some(json!("2025-03-01")))
        );
    }

    #[test]
    fn test_choice_rejects_unknown_option() {
        let status = spec("Status", FieldKind::Choice(&entities::TASK_STATUSES), true);
        let result = validate_field(&status, "paused");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("must be one of"));
        assert_eq!(validate_field(&status, "done"), Ok(Some(json!("done"))));
    }

    #[test]
    fn test_optional_field_skips_empty() {
        let salary = spec("Salary", FieldKind::Money, false);
        assert_eq!(validate_field(&salary, ""), Ok(None));
        assert_eq!(validate_field(&salary, "900"), Ok(Some(json!(900.0))));
    }

    // ==========================================
    // Machines: leftover
    // ==========================================

    #[test]
    fn test_leftover_formula() {
        assert_eq!(leftover(10, 3, 2), 5);
        assert_eq!(leftover(10, 0, 0), 10);
    }

    #[test]
    fn test_leftover_clamps_at_zero() {
        assert_eq!(leftover(4, 3, 2), 0); // over-consumed, never negative
        assert_eq!(leftover(0, 0, 0), 0);
    }

    #[test]
    fn test_leftover_saturates_at_extreme_counts() {
        // Counts near the integer limit must clamp, not wrap.
        assert_eq!(leftover(1, i64::MAX, i64::MAX), 0);
        assert_eq!(leftover(0, i64::MAX, 1), 0);
        assert_eq!(leftover(i64::MAX, 0, 0), i64::MAX);
        assert_eq!(leftover(i64::MAX, 1, i64::MAX), 0);
    }

    #[test]
    fn test_machine_finalize_computes_leftover() {
        let desc = entities::descriptor(EntityKey::Machines);
        let finalize = desc.finalize.expect("machines derive a leftover");
        // PHP backends hand numbers back as strings; the hook tolerates both.
        let mut values = object(json!({ "quantity": "10", "used": 3, "damaged": "2" }));
        finalize(&mut values);
        assert_eq!(values.get("leftover"), Some(&json!(5)));
    }

    // ==========================================
    // Descriptors
    // ==========================================

    const ALL_ENTITIES: [EntityKey; 10] = [
        EntityKey::Projects,
        EntityKey::Employees,
        EntityKey::Architects,
        EntityKey::Machines,
        EntityKey::Expenses,
        EntityKey::BudgetCategories,
        EntityKey::ProjectBudgets,
        EntityKey::Tasks,
        EntityKey::TeamMembers,
        EntityKey::Documents,
    ];

    #[test]
    fn test_descriptor_endpoints_are_unique_php_scripts() {
        let mut endpoints = HashSet::new();
        for key in ALL_ENTITIES {
            let desc = entities::descriptor(key);
            assert!(endpoints.insert(desc.endpoint), "{}", desc.endpoint);
            assert!(desc.endpoint.ends_with(".php"), "{}", desc.endpoint);
            assert!(!desc.fields.is_empty());
            assert_eq!(desc.columns[0].0, "id");
        }
        assert_eq!(endpoints.len(), ALL_ENTITIES.len());
    }

    #[test]
    fn test_lookup_endpoints_match_descriptors() {
        assert_eq!(
            Lookup::Projects.endpoint(),
            entities::descriptor(EntityKey::Projects).endpoint
        );
        assert_eq!(
            Lookup::BudgetCategories.endpoint(),
            entities::descriptor(EntityKey::BudgetCategories).endpoint
        );
        assert_eq!(
            Lookup::Tasks.endpoint(),
            entities::descriptor(EntityKey::Tasks).endpoint
        );
        // Users and suppliers are reference lists without a CRUD screen.
        assert_eq!(Lookup::Users.endpoint(), "users.php");
        assert_eq!(Lookup::Suppliers.endpoint(), "suppliers.php");
        assert_eq!(Lookup::Users.label_key(), "username");
    }

    // ==========================================
    // Session & roles
    // ==========================================

    #[test]
    fn test_role_absent_is_member() {
        let session = Session {
            id: 3,
            username: "mira".to_string(),
            role: None,
            photo: None,
        };
        // No role never grants admin rights.
        assert_eq!(session.role(), Role::Member);
        assert!(!session.role().can_manage());
    }

    #[test]
    fn test_role_unknown_is_member() {
        let session = Session {
            id: 3,
            username: "mira".to_string(),
            role: Some("foreman".to_string()),
            photo: None,
        };
        assert_eq!(session.role(), Role::Member);
    }

    #[test]
    fn test_role_admin_any_case() {
        for role in ["admin", "Admin", "ADMIN"] {
            let session = Session {
                id: 1,
                username: "bob".to_string(),
                role: Some(role.to_string()),
                photo: None,
            };
            assert_eq!(session.role(), Role::Admin, "{role}");
        }
    }

    #[test]
    fn test_session_store_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::at(dir.path());
        assert!(store.load_session().is_none());

        store.save_session(&admin_session()).expect("save");
        assert_eq!(store.load_session(), Some(admin_session()));
    }

    #[test]
    fn test_session_clear_removes_file() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::at(dir.path());
        store.save_session(&admin_session()).expect("save");

        store.clear_session().expect("clear");
        assert!(store.load_session().is_none());
        // Clearing twice is fine.
        store.clear_session().expect("clear again");
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::at(dir.path());
        assert!(store.load_settings().is_none());

        let settings = AppSettings {
            api_url: "http://localhost/consty/api".to_string(),
        };
        store.save_settings(&settings).expect("save");
        assert_eq!(store.load_settings(), Some(settings));
    }

    #[test]
    fn test_require_session_when_signed_out() {
        let dir = TempDir::new().expect("temp dir");
        let ctx = AppContext {
            settings: AppSettings {
                api_url: "http://localhost".to_string(),
            },
            store: SessionStore::at(dir.path()),
            api: client_with(&FakeTransport::new()),
        };
        let err = ctx.require_session().unwrap_err();
        assert!(err.to_string().contains("not signed in"));
    }

    #[test]
    fn test_require_admin_blocks_member() {
        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::at(dir.path());
        store
            .save_session(&Session {
                id: 2,
                username: "mira".to_string(),
                role: Some("foreman".to_string()),
                photo: None,
            })
            .expect("save");
        let ctx = AppContext {
            settings: AppSettings {
                api_url: "http://localhost".to_string(),
            },
            store,
            api: client_with(&FakeTransport::new()),
        };

        assert!(ctx.require_session().is_ok());
        let err = ctx.require_admin().unwrap_err();
        assert!(err.to_string().contains("administrator"));
    }

    // ==========================================
    // API envelope rules
    // ==========================================

    #[test]
    fn test_login_stores_session_scenario() {
        let fake = FakeTransport::new();
        fake.route(
            Method::Post,
            "login.php",
            200,
            r#"{"id": 1, "username": "bob", "role": "admin", "photo": "p.png"}"#,
        );
        let client = client_with(&fake);

        let session = client.login("bob", "secret").expect("login");
        assert_eq!(session, admin_session());
        assert_eq!(session.role(), Role::Admin);

        // Credentials went out as JSON.
        match fake.body_at(0) {
            Body::Json(payload) => {
                assert_eq!(payload.get("username"), Some(&json!("bob")));
                assert_eq!(payload.get("password"), Some(&json!("secret")));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }

        let dir = TempDir::new().expect("temp dir");
        let store = SessionStore::at(dir.path());
        store.save_session(&session).expect("save");
        assert_eq!(store.load_session(), Some(session));
    }

    #[test]
    fn test_parse_session_accepts_string_id() {
        let session =
            parse_session(&json!({ "id": "7", "username": "ana" })).expect("string id");
        assert_eq!(session.id, 7);
        assert_eq!(session.role(), Role::Member);
        assert!(session.photo.is_none());
    }

    #[test]
    fn test_parse_session_requires_username() {
        match parse_session(&json!({ "id": 7 })) {
            Err(ApiError::Parse(message)) => assert!(message.contains("username")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_server_error_surfaces_verbatim() {
        let fake = FakeTransport::new();
        fake.route(Method::Post, "signup.php", 200, r#"{"error": "Username taken"}"#);
        let client = client_with(&fake);

        match client.submit(Method::Post, "signup.php", Body::Json(json!({}))) {
            Err(ApiError::Server(message)) => assert_eq!(message, "Username taken"),
            other => panic!("expected server error, got {other:?}"),
        }
    }

    #[test]
    fn test_error_key_wins_on_http_error_status() {
        let fake = FakeTransport::new();
        fake.route(
            Method::Post,
            "projects.php",
            422,
            r#"{"error": "End date before start date"}"#,
        );
        let client = client_with(&fake);

        match client.submit(Method::Post, "projects.php", Body::Json(json!({}))) {
            Err(ApiError::Server(message)) => {
                assert_eq!(message, "End date before start date");
            }
            other => panic!("expected the server message, got {other:?}"),
        }
    }

    #[test]
    fn test_http_failure_without_error_body() {
        let fake = FakeTransport::new();
        fake.route(Method::Get, "projects.php", 500, "Internal Server Error");
        let client = client_with(&fake);

        match client.fetch_list("projects.php") {
            Err(ApiError::Server(message)) => {
                assert_eq!(message, "Request failed (HTTP 500)");
            }
            other => panic!("expected generic failure, got {other:?}"),
        }
    }

    #[test]
    fn test_non_json_success_is_parse_failure() {
        let fake = FakeTransport::new();
        fake.route(Method::Get, "projects.php", 200, "<html>notice</html>");
        let client = client_with(&fake);

        assert!(matches!(
            client.fetch_list("projects.php"),
            Err(ApiError::Parse(_))
        ));
    }

    #[test]
    fn test_network_failure_category() {
        let client = client_with(&FakeTransport::new());
        assert!(matches!(
            client.fetch_list("projects.php"),
            Err(ApiError::Network(_))
        ));
    }

    #[test]
    fn test_list_accepts_bare_array_and_data_envelope() {
        let fake = FakeTransport::new();
        fake.route(Method::Get, "projects.php", 200, r#"[{"id": 1}]"#);
        fake.route(
            Method::Get,
            "employees.php",
            200,
            r#"{"data": [{"id": "2"}, {"id": 3}]}"#,
        );
        let client = client_with(&fake);

        let bare = client.fetch_list("projects.php").expect("bare array");
        assert_eq!(bare.len(), 1);

        let wrapped = client.fetch_list("employees.php").expect("envelope");
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[0].get("id").and_then(value_i64), Some(2));
    }

    // ==========================================
    // Query layer
    // ==========================================

    #[test]
    fn test_reference_lists_fetched_once_per_run() {
        let fake = FakeTransport::new();
        fake.route(Method::Get, "projects.php", 200, r#"[{"id": 1, "name": "Villa"}]"#);
        let client = client_with(&fake);
        let queries = Queries::new(&client);

        let first = queries.list("projects.php").expect("first");
        let second = queries.list("projects.php").expect("second");
        assert_eq!(first, second);
        assert_eq!(fake.count(Method::Get, "projects.php"), 1);
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let fake = FakeTransport::new();
        fake.route(Method::Get, "tasks.php", 200, "[]");
        let client = client_with(&fake);
        let queries = Queries::new(&client);

        queries.list("tasks.php").expect("list");
        queries.refresh("tasks.php").expect("refresh");
        assert_eq!(fake.count(Method::Get, "tasks.php"), 2);
    }

    #[test]
    fn test_dashboard_placeholder_on_failure() {
        let client = client_with(&FakeTransport::new());
        let queries = Queries::new(&client);

        let (stats, source) = queries.dashboard();
        assert_eq!(source, DataSource::Placeholder);
        assert_eq!(stats, placeholder_stats());
        // The sample data keeps one overrun so the red path stays visible.
        assert!(stats.budgets.iter().any(|line| line.actual > line.planned));
    }

    #[test]
    fn test_dashboard_parses_live_stats() {
        let fake = FakeTransport::new();
        fake.route(
            Method::Get,
            "dashboard.php",
            200,
            r#"{
                "projects": 2, "employees": 5, "architects": 1, "machines": 3,
                "pending_tasks": 1, "in_progress_tasks": 2, "done_tasks": 4,
                "total_expenses": 900.5,
                "budgets": [{"project": "Villa", "planned": 100.0, "actual": 40.0}]
            }"#,
        );
        let client = client_with(&fake);
        let queries = Queries::new(&client);

        let (stats, source) = queries.dashboard();
        assert_eq!(source, DataSource::Live);
        assert_eq!(stats.projects, 2);
        assert_eq!(stats.done_tasks, 4);
        assert_eq!(stats.budgets.len(), 1);
        assert_eq!(stats.budgets[0].project, "Villa");
    }

    // ==========================================
    // Mutate-then-refresh contract
    // ==========================================

    #[test]
    fn test_create_refreshes_list_exactly_once() {
        let fake = FakeTransport::new();
        fake.route(Method::Post, "budget_categories.php", 200, r#"{"id": 9}"#);
        fake.route(
            Method::Get,
            "budget_categories.php",
            200,
            r#"[{"id": 9, "name": "Concrete"}]"#,
        );
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::BudgetCategories);

        let rows = submit_entity(&queries, desc, object(json!({ "name": "Concrete" })), None, None)
            .expect("create");
        assert_eq!(rows.len(), 1);
        assert_eq!(
            fake.requests(),
            vec![
                (Method::Post, "budget_categories.php".to_string()),
                (Method::Get, "budget_categories.php".to_string()),
            ]
        );
    }

    #[test]
    fn test_failed_create_skips_refresh() {
        let fake = FakeTransport::new();
        fake.route(
            Method::Post,
            "budget_categories.php",
            200,
            r#"{"error": "Name required"}"#,
        );
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::BudgetCategories);

        let result = submit_entity(&queries, desc, object(json!({ "name": "" })), None, None);
        assert!(matches!(result, Err(ApiError::Server(_))));
        assert_eq!(fake.count(Method::Get, "budget_categories.php"), 0);
    }

    #[test]
    fn test_edit_sends_patch_with_record_id() {
        let fake = FakeTransport::new();
        fake.route(Method::Patch, "budget_categories.php", 200, r#"{"id": 4}"#);
        fake.route(Method::Get, "budget_categories.php", 200, "[]");
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::BudgetCategories);

        submit_entity(&queries, desc, object(json!({ "name": "Steel" })), None, Some(4))
            .expect("edit");

        match fake.body_at(0) {
            Body::Json(payload) => {
                assert_eq!(payload.get("id"), Some(&json!(4)));
                assert_eq!(payload.get("name"), Some(&json!("Steel")));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
        assert_eq!(fake.count(Method::Get, "budget_categories.php"), 1);
    }

    #[test]
    fn test_delete_sends_id_and_refreshes_once() {
        let fake = FakeTransport::new();
        fake.route(Method::Delete, "tasks.php", 200, r#"{"deleted": true}"#);
        fake.route(Method::Get, "tasks.php", 200, "[]");
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::Tasks);

        delete_entity(&queries, desc, 3).expect("delete");

        match fake.body_at(0) {
            Body::Json(payload) => assert_eq!(payload, json!({ "id": 3 })),
            other => panic!("expected JSON body, got {other:?}"),
        }
        assert_eq!(fake.count(Method::Get, "tasks.php"), 1);
    }

    #[test]
    fn test_machine_submit_carries_leftover() {
        let fake = FakeTransport::new();
        fake.route(Method::Post, "machines.php", 200, r#"{"id": 1}"#);
        fake.route(Method::Get, "machines.php", 200, "[]");
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::Machines);

        let values = object(json!({
            "name": "Tower crane",
            "quantity": 10,
            "unit_price": 250.0,
            "project_id": 1,
            "supplier_id": 2,
            "used": 3,
            "damaged": 2
        }));
        submit_entity(&queries, desc, values, None, None).expect("create");

        match fake.body_at(0) {
            Body::Json(payload) => assert_eq!(payload.get("leftover"), Some(&json!(5))),
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_document_upload_goes_multipart() {
        let fake = FakeTransport::new();
        fake.route(Method::Post, "documents.php", 200, r#"{"id": 2}"#);
        fake.route(Method::Get, "documents.php", 200, "[]");
        let client = client_with(&fake);
        let queries = Queries::new(&client);
        let desc = entities::descriptor(EntityKey::Documents);

        let values = object(json!({ "title": "Site plan", "project_id": 1 }));
        let upload = Some(("file".to_string(), PathBuf::from("plan.pdf")));
        submit_entity(&queries, desc, values, upload, None).expect("create");

        match fake.body_at(0) {
            Body::Multipart { fields, file } => {
                assert!(fields.contains(&("title".to_string(), "Site plan".to_string())));
                assert!(fields.contains(&("project_id".to_string(), "1".to_string())));
                let (part, path) = file.expect("file part");
                assert_eq!(part, "file");
                assert_eq!(path, PathBuf::from("plan.pdf"));
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
        assert_eq!(fake.count(Method::Get, "documents.php"), 1);
    }

    // ==========================================
    // Profile & password updates
    // ==========================================

    #[test]
    fn test_profile_update_with_photo_goes_multipart() {
        let fake = FakeTransport::new();
        fake.route(
            Method::Patch,
            "profile.php",
            200,
            r#"{"id": 1, "username": "bobby", "photo": "new.png"}"#,
        );
        let client = client_with(&fake);

        let value = client
            .update_profile(1, "bobby", Some(PathBuf::from("new.png")))
            .expect("update");
        assert_eq!(value.get("photo"), Some(&json!("new.png")));

        match fake.body_at(0) {
            Body::Multipart { fields, file } => {
                assert!(fields.contains(&("id".to_string(), "1".to_string())));
                assert!(fields.contains(&("username".to_string(), "bobby".to_string())));
                let (part, path) = file.expect("photo part");
                assert_eq!(part, "photo");
                assert_eq!(path, PathBuf::from("new.png"));
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn test_profile_update_without_photo_stays_json() {
        let fake = FakeTransport::new();
        fake.route(Method::Patch, "profile.php", 200, r#"{"id": 1}"#);
        let client = client_with(&fake);

        client.update_profile(1, "bobby", None).expect("update");

        match fake.body_at(0) {
            Body::Json(payload) => {
                assert_eq!(payload.get("id"), Some(&json!(1)));
                assert_eq!(payload.get("username"), Some(&json!("bobby")));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_password_change_patches_settings() {
        let fake = FakeTransport::new();
        fake.route(Method::Patch, "settings.php", 200, r#"{"success": true}"#);
        let client = client_with(&fake);

        client.update_settings(1, "old-pass", "new-pass").expect("update");

        assert_eq!(fake.requests(), vec![(Method::Patch, "settings.php".to_string())]);
        match fake.body_at(0) {
            Body::Json(payload) => {
                assert_eq!(payload.get("id"), Some(&json!(1)));
                assert_eq!(payload.get("current_password"), Some(&json!("old-pass")));
                assert_eq!(payload.get("new_password"), Some(&json!("new-pass")));
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    // ==========================================
    // Dashboard rendering helpers
    // ==========================================

    #[test]
    fn test_bar_width_scaling() {
        assert_eq!(bar_width(10, 10), 24);
        assert_eq!(bar_width(5, 10), 12);
        assert_eq!(bar_width(0, 10), 0);
        assert_eq!(bar_width(1, 100), 1); // non-zero stays visible
        assert_eq!(bar_width(3, 0), 0);
    }

    #[test]
    fn test_bar_width_handles_huge_counts() {
        // A buggy server can report absurd counts; the bar stays in range.
        assert_eq!(bar_width(i64::MAX, i64::MAX), 24);
        assert_eq!(bar_width(i64::MAX, 1), 24);
        assert_eq!(bar_width(1, i64::MAX), 1);
    }
}
