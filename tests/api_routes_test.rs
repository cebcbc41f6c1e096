mod common;

use axum::http::{header, Method, StatusCode};
use common::{body_bytes, json_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn registry_endpoints_create_and_reject() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/locations",
            Some(json!({ "name": "Headquarters", "code": "HQ" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["code"], "HQ");
    let hq_id = body["data"]["id"].as_i64().unwrap();

    let duplicate = app
        .request(
            Method::POST,
            "/api/v1/locations",
            Some(json!({ "name": "Head office", "code": "HQ" })),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(duplicate).await["error"], "Conflict");

    let bad_code = app
        .request(
            Method::POST,
            "/api/v1/locations",
            Some(json!({ "name": "Branch", "code": "BR 2" })),
        )
        .await;
    assert_eq!(bad_code.status(), StatusCode::BAD_REQUEST);

    let room = app
        .request(
            Method::POST,
            "/api/v1/sublocations",
            Some(json!({ "name": "Room 1", "code": "RM1", "location_id": hq_id })),
        )
        .await;
    assert_eq!(room.status(), StatusCode::CREATED);

    let rooms = app
        .request(
            Method::GET,
            &format!("/api/v1/sublocations?location_id={hq_id}"),
            None,
        )
        .await;
    assert_eq!(rooms.status(), StatusCode::OK);
    let rooms = json_body(rooms).await;
    assert_eq!(rooms["data"].as_array().unwrap().len(), 1);

    let missing = app.request(Method::GET, "/api/v1/locations/4242", None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(missing).await["error"], "Not Found");
}

#[tokio::test]
async fn asset_registration_and_move_over_http() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;

    let created = app
        .request(
            Method::POST,
            "/api/v1/assets",
            Some(json!({
                "name": "Laptop 14",
                "type": "Laptop",
                "category_id": r.elec,
                "subcategory_id": r.laptop,
                "location_id": r.hq,
                "sublocation_id": r.rm1,
                "purchased_on": "2024-01-15",
                "purchase_price": 1200.0,
                "depreciation": 300.0
            })),
        )
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);
    let created = json_body(created).await;
    assert_eq!(created["data"]["asset"]["serial_number"], "HQ-ELEC-RM1-001");
    assert_eq!(created["data"]["asset"]["status"], "Active");
    assert_eq!(created["data"]["barcode"]["written"], "HQ-ELEC-RM1-001");
    let id = created["data"]["asset"]["id"].as_i64().unwrap();

    let same_place = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{id}/move"),
            Some(json!({ "location_id": r.hq, "sublocation_id": r.rm1 })),
        )
        .await;
    assert_eq!(same_place.status(), StatusCode::OK);
    let same_place = json_body(same_place).await;
    assert_eq!(same_place["data"]["changed"], false);
    assert_eq!(
        same_place["data"]["message"],
        "No changes: asset is already at this location"
    );
    assert!(same_place["data"]["movement"].is_null());

    let moved = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{id}/move"),
            Some(json!({ "location_id": r.br2, "sublocation_id": r.rm5 })),
        )
        .await;
    assert_eq!(moved.status(), StatusCode::OK);
    let moved = json_body(moved).await;
    assert_eq!(moved["data"]["changed"], true);
    assert_eq!(moved["data"]["asset"]["serial_number"], "BR2-ELEC-RM5-001");
    assert_eq!(moved["data"]["previous_serial"], "HQ-ELEC-RM1-001");
    assert_eq!(moved["data"]["movement"]["from_location_id"], r.hq);
    assert_eq!(moved["data"]["movement"]["to_location_id"], r.br2);
    assert_eq!(moved["data"]["barcode"]["retired"], true);

    let by_serial = app
        .request(Method::GET, "/api/v1/assets/by-serial/BR2-ELEC-RM5-001", None)
        .await;
    assert_eq!(by_serial.status(), StatusCode::OK);
    assert_eq!(json_body(by_serial).await["data"]["id"], id);

    let detail = app
        .request(Method::GET, &format!("/api/v1/assets/{id}"), None)
        .await;
    let detail = json_body(detail).await;
    assert_eq!(detail["data"]["location"]["code"], "BR2");
    assert_eq!(detail["data"]["sublocation"]["code"], "RM5");
    assert_eq!(detail["data"]["barcode_present"], true);

    let movements = app
        .request(Method::GET, &format!("/api/v1/assets/{id}/movements"), None)
        .await;
    assert_eq!(
        json_body(movements).await["data"].as_array().unwrap().len(),
        1
    );

    let wrong_room = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{id}/move"),
            Some(json!({ "location_id": r.hq, "sublocation_id": r.rm5 })),
        )
        .await;
    assert_eq!(wrong_room.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .request(
            Method::POST,
            "/api/v1/assets/4242/move",
            Some(json!({ "location_id": r.hq, "sublocation_id": r.rm1 })),
        )
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn serial_collision_is_a_conflict() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;
    app.register("Laptop", (r.elec, r.laptop), (r.hq, r.rm1))
        .await
        .unwrap();

    let response = app
        .request(
            Method::POST,
            "/api/v1/assets",
            Some(json!({
                "name": "Phone",
                "type": "Phone",
                "category_id": r.elec,
                "subcategory_id": r.phone,
                "location_id": r.hq,
                "sublocation_id": r.rm1,
                "purchased_on": "2024-02-01"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(
        body["message"],
        "Conflict: Serial number HQ-ELEC-RM1-001 is already in use"
    );
}

#[tokio::test]
async fn barcode_is_served_as_png() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;
    let asset = app
        .register("Desk", (r.furn, r.desk), (r.hq, r.rm2))
        .await
        .unwrap()
        .asset;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/assets/{}/barcode", asset.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    let png = body_bytes(response).await;
    assert_eq!(&png[..4], b"\x89PNG");

    let regenerated = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{}/barcode", asset.id),
            None,
        )
        .await;
    assert_eq!(regenerated.status(), StatusCode::OK);

    let missing = app
        .request(Method::GET, "/api/v1/assets/4242/barcode", None)
        .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn maintenance_and_disposal_over_http() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;
    let asset = app
        .register("Desk", (r.furn, r.desk), (r.hq, r.rm2))
        .await
        .unwrap()
        .asset;

    let backwards = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{}/maintenance", asset.id),
            Some(json!({
                "start_date": "2024-05-10",
                "end_date": "2024-05-01",
                "type": "Repair"
            })),
        )
        .await;
    assert_eq!(backwards.status(), StatusCode::BAD_REQUEST);

    let scheduled = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{}/maintenance", asset.id),
            Some(json!({
                "start_date": "2024-05-01",
                "end_date": "2024-05-10",
                "type": "Repair",
                "description": "Wobbly leg"
            })),
        )
        .await;
    assert_eq!(scheduled.status(), StatusCode::CREATED);
    assert_eq!(json_body(scheduled).await["data"]["type"], "Repair");

    let history = app
        .request(
            Method::GET,
            &format!("/api/v1/assets/{}/maintenance", asset.id),
            None,
        )
        .await;
    assert_eq!(json_body(history).await["data"].as_array().unwrap().len(), 1);

    let disposed = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{}/dispose", asset.id),
            Some(json!({ "disposal_date": "2025-01-31", "reason": "Beyond repair" })),
        )
        .await;
    assert_eq!(disposed.status(), StatusCode::CREATED);
    let disposed = json_body(disposed).await;
    assert_eq!(disposed["data"]["asset"]["status"], "Disposed");
    assert_eq!(disposed["data"]["disposal"]["disposal_date"], "2025-01-31");

    let twice = app
        .request(
            Method::POST,
            &format!("/api/v1/assets/{}/dispose", asset.id),
            Some(json!({})),
        )
        .await;
    assert_eq!(twice.status(), StatusCode::CONFLICT);

    let report = app
        .request(Method::GET, "/api/v1/reports/disposals", None)
        .await;
    let report = json_body(report).await;
    assert_eq!(report["data"][0]["reason"], "Beyond repair");
}

#[tokio::test]
async fn asset_listing_filters_and_pages() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;
    app.register("Laptop A", (r.elec, r.laptop), (r.hq, r.rm1))
        .await
        .unwrap();
    app.register("Laptop B", (r.elec, r.laptop), (r.br2, r.rm5))
        .await
        .unwrap();
    app.register("Desk", (r.furn, r.desk), (r.hq, r.rm2))
        .await
        .unwrap();

    let all = json_body(app.request(Method::GET, "/api/v1/assets?limit=2", None).await).await;
    assert_eq!(all["data"]["total"], 3);
    assert_eq!(all["data"]["total_pages"], 2);
    assert_eq!(all["data"]["items"].as_array().unwrap().len(), 2);

    let at_hq = json_body(
        app.request(
            Method::GET,
            &format!("/api/v1/assets?location_id={}", r.hq),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(at_hq["data"]["total"], 2);
}

#[tokio::test]
async fn health_and_docs_are_mounted() {
    let app = TestApp::new().await;

    let live = app.request(Method::GET, "/health/live", None).await;
    assert_eq!(live.status(), StatusCode::OK);

    let ready = app.request(Method::GET, "/health/ready", None).await;
    assert_eq!(ready.status(), StatusCode::OK);
    let ready = json_body(ready).await;
    assert_eq!(ready["status"], "up");
    assert_eq!(ready["details"]["database"]["status"], "up");

    let docs = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(docs.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/locations", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn oversized_text_is_rejected_before_the_database() {
    let app = TestApp::new().await;
    let r = app.seed_registry().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/assets",
            Some(json!({
                "name": "x".repeat(101),
                "type": "Laptop",
                "category_id": r.elec,
                "subcategory_id": r.laptop,
                "location_id": r.hq,
                "sublocation_id": r.rm1,
                "purchased_on": "2024-01-15"
            })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Bad Request");

    let location = app
        .request(
            Method::POST,
            "/api/v1/locations",
            Some(json!({ "name": "n".repeat(51), "code": "LONG" })),
        )
        .await;
    assert_eq!(location.status(), StatusCode::BAD_REQUEST);

    let listed = json_body(app.request(Method::GET, "/api/v1/assets", None).await).await;
    assert_eq!(listed["data"]["total"], 0);
}
