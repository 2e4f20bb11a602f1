#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use axum_test::multipart::{MultipartForm, Part};
    use rust_decimal::Decimal;
    use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set};
    use serde_json::{Value, json};

    use model::entities::{blog, cart, industry, product, product_color};

    use crate::router::create_router;
    use crate::schemas::AppState;
    use crate::test_utils::test_utils::{
        RecordingNotifier, seed_admin, setup_test_app, setup_test_app_state,
        setup_test_app_with_state,
    };

    // Helper functions

    async fn signup_customer(server: &TestServer, username: &str) -> (String, i32) {
        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "customer",
                "username": username,
                "password": "customer-pass",
                "first_name": "Test",
                "last_name": "Customer",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        (
            body["tokens"]["access"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap() as i32,
        )
    }

    async fn signup_store_owner(
        server: &TestServer,
        state: &AppState,
        username: &str,
    ) -> (String, i32) {
        let industry = industry::Entity::find()
            .one(&state.db)
            .await
            .unwrap()
            .expect("industry seeded");

        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "store_owner",
                "username": username,
                "password": "owner-pass",
                "first_name": "Sara",
                "last_name": "Owner",
                "store_name": "Sara's Shop",
                "industry": industry.id,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        (
            body["tokens"]["access"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap() as i32,
        )
    }

    /// Inserts a physical product row directly, bypassing the HTTP surface.
    async fn seed_physical_product(
        state: &AppState,
        owner_id: i32,
        title: &str,
        active: bool,
    ) -> product::Model {
        let industry = industry::Entity::find()
            .one(&state.db)
            .await
            .unwrap()
            .expect("industry seeded");
        let color = product_color::Entity::find()
            .filter(product_color::Column::Name.eq("Blue"))
            .one(&state.db)
            .await
            .unwrap()
            .expect("color seeded");

        let mut row = product::new_row(
            owner_id,
            Some(industry.id),
            title.to_string(),
            "A test product".to_string(),
            Decimal::new(150000, 2),
            product::ProductAttributes::Physical {
                length: 30,
                width: 20,
                weight: 2,
                color_id: color.id,
            },
        );
        if !active {
            row.active = Set(false);
        }

        use sea_orm::ActiveModelTrait;
        row.insert(&state.db).await.expect("product inserted")
    }

    /// Inserts a blog row directly, bypassing the HTTP surface and the cache.
    async fn seed_blog(state: &AppState, product_id: i32, title: &str) -> blog::Model {
        use sea_orm::ActiveModelTrait;
        blog::ActiveModel {
            product_id: Set(product_id),
            title: Set(title.to_string()),
            description: Set("About".to_string()),
            content: Set("<p>seeded</p>".to_string()),
            active: Set(true),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .expect("blog inserted")
    }

    fn blog_form(product_id: i32, title: &str, html: &[u8]) -> MultipartForm {
        MultipartForm::new()
            .add_text("product_id", product_id.to_string())
            .add_text("title", title.to_string())
            .add_text("description", "A blog post".to_string())
            .add_part(
                "content_file",
                Part::bytes(html.to_vec())
                    .file_name("post.html")
                    .mime_type("text/html"),
            )
    }

    // Health

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;
        response.assert_status(StatusCode::OK);

        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    // Identity

    #[tokio::test]
    async fn test_signup_customer_and_login() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "customer",
                "username": "ali",
                "password": "secret-pass",
                "first_name": "Ali",
                "last_name": "Tester",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], "Customer created successfully");
        assert_eq!(body["user"]["username"], "ali");
        assert_eq!(body["user"]["user_type"], "customer");
        assert!(body["tokens"]["access"].as_str().unwrap().len() > 0);
        assert!(body["tokens"]["refresh"].as_str().unwrap().len() > 0);

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "ali", "password": "secret-pass"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["success"], "Login was successful");
        assert_eq!(body["user"]["user_type"], "customer");
    }

    #[tokio::test]
    async fn test_signup_requires_user_type() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({"username": "nobody"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "user_type is required");
    }

    #[tokio::test]
    async fn test_signup_rejects_unknown_user_type() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "superuser",
                "username": "x",
                "password": "x",
                "first_name": "x",
                "last_name": "x",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid user type");
    }

    #[tokio::test]
    async fn test_signup_duplicate_username() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        signup_customer(&server, "taken").await;

        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "customer",
                "username": "taken",
                "password": "another-pass",
                "first_name": "Other",
                "last_name": "User",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "The 'username' taken is already taken.");
    }

    #[tokio::test]
    async fn test_store_owner_signup_requires_store_fields() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // No store_name / industry
        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "store_owner",
                "username": "shopless",
                "password": "pass",
                "first_name": "No",
                "last_name": "Shop",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "All fields are required");

        // Unknown industry id
        let response = server
            .post("/api/v1/auth/signup")
            .json(&json!({
                "user_type": "store_owner",
                "username": "shopless",
                "password": "pass",
                "first_name": "No",
                "last_name": "Shop",
                "store_name": "Ghost Mall",
                "industry": 99999,
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid industry");
    }

    #[tokio::test]
    async fn test_login_with_wrong_password() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        signup_customer(&server, "careful").await;

        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "careful", "password": "wrong"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "user is not exist");
    }

    #[tokio::test]
    async fn test_protected_endpoint_auth_failures() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        // No header at all
        let response = server.get("/api/v1/auth/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Authentication token is required");

        // Garbage token
        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer("not-a-jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_me_returns_profile_without_password() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (token, user_id) = signup_customer(&server, "profiled").await;

        let response = server
            .get("/api/v1/auth/me")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["user_data"]["id"], user_id);
        assert_eq!(body["user_data"]["username"], "profiled");
        assert!(body["user_data"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn test_verify_token() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (token, _) = signup_customer(&server, "verified").await;

        let response = server
            .post("/api/v1/auth/verify")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["value"], true);

        let response = server
            .post("/api/v1/auth/verify")
            .authorization_bearer("bogus")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["value"], false);
    }

    #[tokio::test]
    async fn test_admin_creation_delivers_temporary_credential() {
        let mut state = setup_test_app_state().await;
        let notifier = Arc::new(RecordingNotifier::default());
        state.notifier = notifier.clone();
        let server = TestServer::new(create_router(state.clone())).unwrap();

        seed_admin(&state.db, "root", "root-pass").await;
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "root", "password": "root-pass"}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let token = body["tokens"]["access"].as_str().unwrap().to_string();

        let response = server
            .post("/api/v1/auth/admins")
            .authorization_bearer(&token)
            .json(&json!({
                "first_name": "Second",
                "last_name": "Admin",
                "username": "admin2",
                "phone_number": "+98912345678",
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["success"], "Admin created successfully");
        assert_eq!(body["user"]["user_type"], "admin");

        // The temporary password went out through the notifier, not the API
        assert!(body.get("password").is_none());
        let deliveries = notifier.deliveries.lock().await;
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].0, "+98912345678");
        assert_eq!(deliveries[0].1.len(), 6);
    }

    #[tokio::test]
    async fn test_admin_creation_requires_admin_role() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let (token, _) = signup_customer(&server, "plain").await;
        let response = server
            .post("/api/v1/auth/admins")
            .authorization_bearer(&token)
            .json(&json!({
                "first_name": "Nope",
                "last_name": "Nope",
                "username": "nope",
                "phone_number": "+98912345678",
            }))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_admin_creation_validates_phone_number() {
        let (server, state) = server_with_state().await;

        seed_admin(&state.db, "root", "root-pass").await;
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "root", "password": "root-pass"}))
            .await;
        let body: Value = response.json();
        let token = body["tokens"]["access"].as_str().unwrap().to_string();

        let response = server
            .post("/api/v1/auth/admins")
            .authorization_bearer(&token)
            .json(&json!({
                "first_name": "Bad",
                "last_name": "Phone",
                "username": "badphone",
                "phone_number": "0912345678",
            }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Phone number must start with +98 and be followed by 9 digits."
        );
    }

    async fn server_with_state() -> (TestServer, AppState) {
        let (router, state) = setup_test_app_with_state().await;
        (TestServer::new(router).unwrap(), state)
    }

    // Catalog

    #[tokio::test]
    async fn test_industries_listing() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/industries").await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let industries = body["industries"].as_array().unwrap();
        assert_eq!(industries.len(), 1);
        assert_eq!(industries[0]["name"], "Electronics");
    }

    #[tokio::test]
    async fn test_create_physical_product_and_fetch_detail() {
        let (server, state) = server_with_state().await;
        let (token, _) = signup_store_owner(&server, &state, "sara_store").await;

        let form = MultipartForm::new()
            .add_text("product_title", "Laptop")
            .add_text("product_price", "1500.00")
            .add_text("product_type", "Physical")
            .add_text("description", "A fast laptop")
            .add_text("length", "30")
            .add_text("width", "20")
            .add_text("weight", "2")
            .add_text("color", "Blue")
            .add_part(
                "images",
                Part::bytes(b"front photo".to_vec())
                    .file_name("front.jpg")
                    .mime_type("image/jpeg"),
            )
            .add_part(
                "images",
                Part::bytes(b"side photo".to_vec())
                    .file_name("side.png")
                    .mime_type("image/png"),
            );

        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["title"], "Laptop");
        assert_eq!(created["product_type"], "Physical");
        assert_eq!(created["color"], "Blue");
        assert_eq!(created["images"].as_array().unwrap().len(), 2);
        // The first upload is the designated cover image
        assert_eq!(created["main_image"], created["images"][0]);

        let product_id = created["id"].as_i64().unwrap();
        let response = server
            .get(&format!("/api/v1/products/{}", product_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["product_detail"]["title"], "Laptop");
        assert_eq!(body["product_detail"]["product_type"], "Physical");
        assert_eq!(body["product_detail"]["length"], 30);
        assert_eq!(body["product_detail"]["weight"], 2);
    }

    #[tokio::test]
    async fn test_create_digital_product() {
        let (server, state) = server_with_state().await;
        let (token, _) = signup_store_owner(&server, &state, "digi_store").await;

        let form = MultipartForm::new()
            .add_text("product_title", "Handbook")
            .add_text("product_price", "9.50")
            .add_text("product_type", "digital")
            .add_text("size", "12")
            .add_text("type_of_file", "PDF")
            .add_part(
                "images",
                Part::bytes(b"cover".to_vec())
                    .file_name("cover.jpg")
                    .mime_type("image/jpeg"),
            );

        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["product_type"], "Digital");
        assert_eq!(created["type_of_file"], "PDF");
        assert_eq!(created["size"], 12);
        // The physical attribute group stays empty on a digital product
        assert_eq!(created["length"], Value::Null);
        assert_eq!(created["color"], Value::Null);
    }

    #[tokio::test]
    async fn test_create_product_rejected_for_customer() {
        let (server, _state) = server_with_state().await;
        let (token, _) = signup_customer(&server, "shopper").await;

        let form = MultipartForm::new()
            .add_text("product_title", "Laptop")
            .add_text("product_price", "1500.00")
            .add_text("product_type", "Physical");

        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["error"], "Only store owners can create products");
    }

    #[tokio::test]
    async fn test_create_product_field_validation() {
        let (server, state) = server_with_state().await;
        let (token, _) = signup_store_owner(&server, &state, "strict_store").await;

        // Missing the physical attribute group
        let form = MultipartForm::new()
            .add_text("product_title", "Laptop")
            .add_text("product_price", "1500.00")
            .add_text("product_type", "Physical");
        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "description, length, width, weight, color are required for physical products"
        );

        // Unknown color name
        let form = MultipartForm::new()
            .add_text("product_title", "Laptop")
            .add_text("product_price", "1500.00")
            .add_text("product_type", "Physical")
            .add_text("description", "x")
            .add_text("length", "1")
            .add_text("width", "1")
            .add_text("weight", "1")
            .add_text("color", "Chartreuse");
        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "Invalid color");

        // No images
        let form = MultipartForm::new()
            .add_text("product_title", "Laptop")
            .add_text("product_price", "1500.00")
            .add_text("product_type", "Physical")
            .add_text("description", "x")
            .add_text("length", "1")
            .add_text("width", "1")
            .add_text("weight", "1")
            .add_text("color", "Blue");
        let response = server
            .post("/api/v1/products")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "At least one image is required");
    }

    #[tokio::test]
    async fn test_search_products() {
        let (server, state) = server_with_state().await;
        let (_token, owner_id) = signup_store_owner(&server, &state, "search_store").await;

        let industry = industry::Entity::find()
            .one(&state.db)
            .await
            .unwrap()
            .unwrap();

        seed_physical_product(&state, owner_id, "Gaming Laptop", true).await;
        seed_physical_product(&state, owner_id, "Office Laptop", true).await;
        seed_physical_product(&state, owner_id, "Hidden Laptop", false).await;
        seed_physical_product(&state, owner_id, "Desk Lamp", true).await;

        // Both filter parameters are required
        let response = server.get("/api/v1/products/search").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "'product_type' and 'industry' are required parameters."
        );

        // Unknown product type
        let response = server
            .get(&format!(
                "/api/v1/products/search?product_type=virtual&industry={}",
                industry.id
            ))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Invalid 'product_type' provided. Must be 'Physical' or 'Digital'."
        );

        // Case-insensitive title filter; inactive products stay hidden
        let response = server
            .get(&format!(
                "/api/v1/products/search?product_type=physical&industry={}&title=LAPTOP",
                industry.id
            ))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 2);
        assert!(
            products
                .iter()
                .all(|p| p["title"].as_str().unwrap().contains("Laptop"))
        );

        // Without the title filter, every active physical product shows up
        let response = server
            .get(&format!(
                "/api/v1/products/search?product_type=physical&industry={}",
                industry.id
            ))
            .await;
        let body: Value = response.json();
        assert_eq!(body["products"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_product_detail_not_found() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/products/4242").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product not found");
    }

    #[tokio::test]
    async fn test_delete_product_authorization() {
        let (server, state) = server_with_state().await;
        let (owner_token, owner_id) = signup_store_owner(&server, &state, "del_store").await;
        let (other_token, _) = signup_store_owner(&server, &state, "rival_store").await;

        let product = seed_physical_product(&state, owner_id, "Doomed", true).await;

        // A different store owner may not delete it
        let response = server
            .delete(&format!("/api/v1/products/{}", product.id))
            .authorization_bearer(&other_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);

        // The owner may
        let response = server
            .delete(&format!("/api/v1/products/{}", product.id))
            .authorization_bearer(&owner_token)
            .await;
        response.assert_status(StatusCode::OK);

        let response = server
            .get(&format!("/api/v1/products/{}", product.id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_product_allowed_for_admin() {
        let (server, state) = server_with_state().await;
        let (_owner_token, owner_id) = signup_store_owner(&server, &state, "adm_store").await;
        let product = seed_physical_product(&state, owner_id, "Admin target", true).await;

        seed_admin(&state.db, "root", "root-pass").await;
        let response = server
            .post("/api/v1/auth/login")
            .json(&json!({"username": "root", "password": "root-pass"}))
            .await;
        let body: Value = response.json();
        let token = body["tokens"]["access"].as_str().unwrap().to_string();

        let response = server
            .delete(&format!("/api/v1/products/{}", product.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::OK);
    }

    #[tokio::test]
    async fn test_store_products_owner_sees_inactive() {
        let (server, state) = server_with_state().await;
        let (owner_token, owner_id) = signup_store_owner(&server, &state, "vis_store").await;

        seed_physical_product(&state, owner_id, "Public item", true).await;
        seed_physical_product(&state, owner_id, "Draft item", false).await;

        // Anonymous viewers only see active products
        let response = server
            .get(&format!("/api/v1/stores/{}/products", owner_id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["products"].as_array().unwrap().len(), 1);

        // The owner sees drafts too
        let response = server
            .get(&format!("/api/v1/stores/{}/products", owner_id))
            .authorization_bearer(&owner_token)
            .await;
        let body: Value = response.json();
        assert_eq!(body["products"].as_array().unwrap().len(), 2);

        // A user id that is not a store owner is not a store
        let response = server.get("/api/v1/stores/424242/products").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    // Content

    #[tokio::test]
    async fn test_create_blog_sanitizes_html() {
        let (server, state) = server_with_state().await;
        let (token, owner_id) = signup_store_owner(&server, &state, "blog_store").await;
        let product = seed_physical_product(&state, owner_id, "Blogged", true).await;

        let response = server
            .post("/api/v1/blogs")
            .authorization_bearer(&token)
            .multipart(blog_form(
                product.id,
                "Launch notes",
                b"<p>Hello</p><script>alert(1)</script>",
            ))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["title"], "Launch notes");
        assert_eq!(body["content"], "<p>Hello</p>");
        assert_eq!(body["product"], product.id);
    }

    #[tokio::test]
    async fn test_create_blog_rejected_for_customer() {
        let (server, state) = server_with_state().await;
        let (_owner_token, owner_id) = signup_store_owner(&server, &state, "gate_store").await;
        let product = seed_physical_product(&state, owner_id, "Gated", true).await;

        let (customer_token, _) = signup_customer(&server, "wannabe").await;
        let response = server
            .post("/api/v1/blogs")
            .authorization_bearer(&customer_token)
            .multipart(blog_form(product.id, "Nope", b"<p>Hi</p>"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["error"], "Only store owners can create blogs");
    }

    #[tokio::test]
    async fn test_create_blog_rejects_non_html_upload() {
        let (server, state) = server_with_state().await;
        let (token, owner_id) = signup_store_owner(&server, &state, "pdf_store").await;
        let product = seed_physical_product(&state, owner_id, "Printed", true).await;

        let form = MultipartForm::new()
            .add_text("product_id", product.id.to_string())
            .add_text("title", "Not HTML")
            .add_text("description", "A PDF")
            .add_part(
                "content_file",
                Part::bytes(b"%PDF-1.7 fake".to_vec())
                    .file_name("post.pdf")
                    .mime_type("application/pdf"),
            );

        let response = server
            .post("/api/v1/blogs")
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "File must be of type HTML");
    }

    #[tokio::test]
    async fn test_create_blog_for_unknown_product() {
        let (server, state) = server_with_state().await;
        let (token, _) = signup_store_owner(&server, &state, "lost_store").await;

        let response = server
            .post("/api/v1/blogs")
            .authorization_bearer(&token)
            .multipart(blog_form(99999, "Orphan", b"<p>Hi</p>"))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product does not exist");
    }

    #[tokio::test]
    async fn test_all_blogs_read_through_cache() {
        let (server, state) = server_with_state().await;
        let (token, owner_id) = signup_store_owner(&server, &state, "cache_store").await;
        let product = seed_physical_product(&state, owner_id, "Cached", true).await;
        seed_blog(&state, product.id, "First post").await;

        // First read computes and caches
        let first: Value = server.get("/api/v1/blogs").await.json();
        assert_eq!(first["blogs_list"].as_array().unwrap().len(), 1);

        // A repeated read returns the identical payload
        let second: Value = server.get("/api/v1/blogs").await.json();
        assert_eq!(first, second);

        // A direct database insert bypasses invalidation, so the cached
        // listing is served unchanged
        seed_blog(&state, product.id, "Sneaky post").await;
        let stale: Value = server.get("/api/v1/blogs").await.json();
        assert_eq!(stale["blogs_list"].as_array().unwrap().len(), 1);

        // Writing through the API invalidates, and the next read recomputes
        let response = server
            .post("/api/v1/blogs")
            .authorization_bearer(&token)
            .multipart(blog_form(product.id, "Third post", b"<p>Hi</p>"))
            .await;
        response.assert_status(StatusCode::CREATED);

        let fresh: Value = server.get("/api/v1/blogs").await.json();
        assert_eq!(fresh["blogs_list"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_product_blogs_listing() {
        let (server, state) = server_with_state().await;
        let (_token, owner_id) = signup_store_owner(&server, &state, "pb_store").await;
        let product = seed_physical_product(&state, owner_id, "Documented", true).await;
        seed_blog(&state, product.id, "Manual").await;

        let response = server
            .get(&format!("/api/v1/products/{}/blogs", product.id))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["product_blogs"].as_array().unwrap().len(), 1);

        let response = server.get("/api/v1/products/99999/blogs").await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product does not exist");
    }

    #[tokio::test]
    async fn test_update_blog_and_deactivate() {
        let (server, state) = server_with_state().await;
        let (token, owner_id) = signup_store_owner(&server, &state, "upd_store").await;
        let product = seed_physical_product(&state, owner_id, "Updatable", true).await;

        let created: Value = server
            .post("/api/v1/blogs")
            .authorization_bearer(&token)
            .multipart(blog_form(product.id, "Old title", b"<p>Old</p>"))
            .await
            .json();
        let blog_id = created["id"].as_i64().unwrap();

        let form = MultipartForm::new()
            .add_text("title", "New title")
            .add_text("description", "Updated")
            .add_text("active", "false")
            .add_part(
                "content_file",
                Part::bytes(b"<p>New</p><em>text</em>".to_vec())
                    .file_name("post.html")
                    .mime_type("text/html"),
            );
        let response = server
            .put(&format!("/api/v1/blogs/{}", blog_id))
            .authorization_bearer(&token)
            .multipart(form)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["title"], "New title");
        assert_eq!(body["content"], "<p>New</p><em>text</em>");
        assert_eq!(body["active"], false);

        // Deactivated blogs drop out of the public listing
        let listing: Value = server.get("/api/v1/blogs").await.json();
        assert_eq!(listing["blogs_list"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_blog_role_check() {
        let (server, state) = server_with_state().await;
        let (token, owner_id) = signup_store_owner(&server, &state, "db_store").await;
        let product = seed_physical_product(&state, owner_id, "Deletable", true).await;
        let blog = seed_blog(&state, product.id, "Doomed post").await;

        // Customers hold neither qualifying role
        let (customer_token, _) = signup_customer(&server, "bystander").await;
        let response = server
            .delete(&format!("/api/v1/blogs/{}", blog.id))
            .authorization_bearer(&customer_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(body["error"], "Only store owners and admins can delete blogs");

        // A store owner may delete
        let response = server
            .delete(&format!("/api/v1/blogs/{}", blog.id))
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Blog deleted");
    }

    #[tokio::test]
    async fn test_comment_lifecycle() {
        let (server, state) = server_with_state().await;
        let (_token, owner_id) = signup_store_owner(&server, &state, "cm_store").await;
        let product = seed_physical_product(&state, owner_id, "Discussed", true).await;
        let blog = seed_blog(&state, product.id, "Open thread").await;

        // Unauthenticated comment creation is rejected
        let response = server
            .post("/api/v1/comments")
            .json(&json!({"blog_id": blog.id, "content": "anon"}))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let (author_token, _) = signup_customer(&server, "author").await;

        // Missing fields
        let response = server
            .post("/api/v1/comments")
            .authorization_bearer(&author_token)
            .json(&json!({"blog_id": blog.id}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["error"], "blog_id and content are required");

        // Unknown blog
        let response = server
            .post("/api/v1/comments")
            .authorization_bearer(&author_token)
            .json(&json!({"blog_id": 99999, "content": "lost"}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Blog not found");

        // Successful creation shows up in the cached listing
        let response = server
            .post("/api/v1/comments")
            .authorization_bearer(&author_token)
            .json(&json!({"blog_id": blog.id, "content": "First!"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["message"], "Comment created");

        let listing: Value = server
            .get(&format!("/api/v1/blogs/{}/comments", blog.id))
            .await
            .json();
        let comments = listing["comments"].as_array().unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0]["content"], "First!");
        let comment_id = comments[0]["id"].as_i64().unwrap();

        // A stranger cannot delete the comment
        let (stranger_token, _) = signup_customer(&server, "stranger").await;
        let response = server
            .delete(&format!("/api/v1/comments/{}", comment_id))
            .authorization_bearer(&stranger_token)
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "You do not have permission to delete this comment"
        );

        // The author can, and the listing recomputes empty
        let response = server
            .delete(&format!("/api/v1/comments/{}", comment_id))
            .authorization_bearer(&author_token)
            .await;
        response.assert_status(StatusCode::OK);

        let listing: Value = server
            .get(&format!("/api/v1/blogs/{}/comments", blog.id))
            .await
            .json();
        assert_eq!(listing["comments"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_comments_of_inactive_blog_are_hidden() {
        let (server, state) = server_with_state().await;
        let (_token, owner_id) = signup_store_owner(&server, &state, "hid_store").await;
        let product = seed_physical_product(&state, owner_id, "Quiet", true).await;

        use sea_orm::ActiveModelTrait;
        let hidden = blog::ActiveModel {
            product_id: Set(product.id),
            title: Set("Hidden".to_string()),
            description: Set("x".to_string()),
            content: Set("<p>x</p>".to_string()),
            active: Set(false),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .unwrap();

        let response = server
            .get(&format!("/api/v1/blogs/{}/comments", hidden.id))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Blog does not exist");
    }

    // Cart

    #[tokio::test]
    async fn test_get_cart_before_first_add() {
        let (server, _state) = server_with_state().await;
        let (token, _) = signup_customer(&server, "empty_handed").await;

        let response = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Cart not found");
    }

    #[tokio::test]
    async fn test_cart_requires_authentication() {
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/api/v1/cart").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = response.json();
        assert_eq!(body["error"], "Authentication token is required");
    }

    #[tokio::test]
    async fn test_add_to_cart_and_get() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "cart_store").await;
        let product = seed_physical_product(&state, owner_id, "Cartable", true).await;
        let (token, _) = signup_customer(&server, "buyer").await;

        let response = server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Product added to the cart.");

        let cart: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        let items = cart["cart"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["product"], product.id);
        assert_eq!(items[0]["order_time"], 1);
    }

    #[tokio::test]
    async fn test_repeated_adds_accumulate_in_one_line_item() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "acc_store").await;
        let product = seed_physical_product(&state, owner_id, "Stackable", true).await;
        let (token, _) = signup_customer(&server, "hoarder").await;

        for i in 0..3 {
            let response = server
                .post("/api/v1/cart/add")
                .authorization_bearer(&token)
                .json(&json!({"product_id": product.id}))
                .await;
            response.assert_status(StatusCode::OK);
            let body: Value = response.json();
            let expected = if i == 0 {
                "Product added to the cart."
            } else {
                "Product quantity updated in the cart."
            };
            assert_eq!(body["message"], expected);
        }

        let cart: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        let items = cart["cart"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["order_time"], 3);
    }

    #[tokio::test]
    async fn test_add_to_cart_with_explicit_quantity() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "bulk_store").await;
        let product = seed_physical_product(&state, owner_id, "Bulk item", true).await;
        let (token, _) = signup_customer(&server, "wholesaler").await;

        let response = server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id, "order_time": 5}))
            .await;
        response.assert_status(StatusCode::OK);

        let cart: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(cart["cart"][0]["order_time"], 5);
    }

    #[tokio::test]
    async fn test_add_unknown_product_leaves_no_cart_behind() {
        let (server, state) = server_with_state().await;
        let (token, user_id) = signup_customer(&server, "cautious").await;

        let response = server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": 99999}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product does not exist");

        // No cart row was created as a side effect
        let cart_row = cart::Entity::find()
            .filter(cart::Column::UserId.eq(user_id))
            .one(&state.db)
            .await
            .unwrap();
        assert!(cart_row.is_none());

        let response = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_remove_decrements_then_deletes() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "rm_store").await;
        let product = seed_physical_product(&state, owner_id, "Returnable", true).await;
        let (token, _) = signup_customer(&server, "regretful").await;

        server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id, "order_time": 2}))
            .await
            .assert_status(StatusCode::OK);

        // Quantity 2 -> 1
        let response = server
            .delete("/api/v1/cart/remove")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Product quantity decreased in the cart.");

        let cart: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(cart["cart"][0]["order_time"], 1);

        // Quantity 1 -> the line item disappears
        let response = server
            .delete("/api/v1/cart/remove")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await;
        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["message"], "Product removed from the cart.");

        let cart: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(cart["cart"].as_array().unwrap().len(), 0);

        // A further removal finds no line item
        let response = server
            .delete("/api/v1/cart/remove")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product not found in the cart");
    }

    #[tokio::test]
    async fn test_remove_from_cart_error_paths() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "err_store").await;
        let product = seed_physical_product(&state, owner_id, "Unbought", true).await;
        let (token, _) = signup_customer(&server, "browser").await;

        // Unknown product
        let response = server
            .delete("/api/v1/cart/remove")
            .authorization_bearer(&token)
            .json(&json!({"product_id": 99999}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Product does not exist");

        // Known product, but the user never created a cart
        let response = server
            .delete("/api/v1/cart/remove")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert_eq!(body["error"], "Cart not found");
    }

    #[tokio::test]
    async fn test_cart_cache_invalidated_by_mutations() {
        let (server, state) = server_with_state().await;
        let (_ot, owner_id) = signup_store_owner(&server, &state, "inv_store").await;
        let product = seed_physical_product(&state, owner_id, "Tracked", true).await;
        let (token, _) = signup_customer(&server, "watcher").await;

        server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await
            .assert_status(StatusCode::OK);

        // Prime the cache, then read again: identical payload
        let first: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        let second: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(first, second);
        assert_eq!(first["cart"][0]["order_time"], 1);

        // A mutation invalidates the cached entry, so the next read sees it
        server
            .post("/api/v1/cart/add")
            .authorization_bearer(&token)
            .json(&json!({"product_id": product.id}))
            .await
            .assert_status(StatusCode::OK);

        let fresh: Value = server
            .get("/api/v1/cart")
            .authorization_bearer(&token)
            .await
            .json();
        assert_eq!(fresh["cart"][0]["order_time"], 2);
    }
}
