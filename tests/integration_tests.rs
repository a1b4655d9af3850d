// Integration tests for Bloodbridge

use actix_web::{http::StatusCode, test, web, App};
use bloodbridge::config::MatchingSettings;
use bloodbridge::routes::{self, AppState};
use bloodbridge::services::Directory;
use serde_json::{json, Value};
use std::sync::Arc;

const ASHA_DONOR_ID: &str = "5d2e7f10-8a4b-4c6d-8e9f-0a1b2c3d4e01";
const ASHA_ACCOUNT_ID: &str = "0b6a1c52-3f8e-4d1a-9a57-1c2d3e4f5a01";
const VISITOR_ACCOUNT_ID: &str = "0b6a1c52-3f8e-4d1a-9a57-1c2d3e4f5a04";
const LIFELINE_ID: &str = "9a8b7c6d-5e4f-4a3b-8c2d-1e0f9a8b7c01";

fn seeded_state() -> AppState {
    let directory = Directory::load_seed("data/seed.json").expect("seed file should load");
    AppState::new(Arc::new(directory), MatchingSettings::default())
}

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(seeded_state()))
                .configure(routes::configure_extractors)
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn emergency_request_body() -> Value {
    json!({
        "requestedBy": ASHA_ACCOUNT_ID,
        "patientName": "R. Kumar",
        "contactNumber": "9845011111",
        "bloodType": "O-",
        "unitsRequired": 2,
        "hospitalLocation": "St. John's Hospital, Koramangala",
        "emergencyDetails": "Post-operative haemorrhage",
        "latitude": 12.9300,
        "longitude": 77.6200,
        "selectedBloodBankId": LIFELINE_ID,
        "urgency": "critical"
    })
}

#[actix_web::test]
async fn test_health_reports_seeded_counts() {
    let app = init_app!();

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert_eq!(body["records"]["accounts"], 4);
    assert_eq!(body["records"]["donors"], 1);
    assert_eq!(body["records"]["blood_banks"], 2);
    assert_eq!(body["records"]["hospitals"], 0);
}

#[actix_web::test]
async fn test_match_bangalore_to_chennai() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "latitude": 12.9716,
            "longitude": 77.5946,
            "radiusKm": 350.0,
            "limit": 5,
            "candidates": [
                {
                    "id": "chennai",
                    "location": { "latitude": 13.0827, "longitude": 80.2707 },
                    "payload": { "name": "Chennai" }
                },
                { "id": "unset", "location": null, "payload": null }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let matches = body["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["id"], "chennai");

    let distance = matches[0]["distanceKm"].as_f64().unwrap();
    assert!((distance - 290.0).abs() < 5.0, "got {}", distance);
}

#[actix_web::test]
async fn test_match_candidate_payload_is_optional() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "latitude": 12.9716,
            "longitude": 77.5946,
            "radiusKm": 10.0,
            "candidates": [
                { "id": "mg-road", "location": { "latitude": 12.9756, "longitude": 77.6050 } }
            ]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["matches"][0]["id"], "mg-road");
    assert!(body["matches"][0]["payload"].is_null());
}

#[actix_web::test]
async fn test_match_rejects_zero_radius() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .set_json(json!({
            "latitude": 12.9716,
            "longitude": 77.5946,
            "radiusKm": 0.0,
            "candidates": []
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_invalid_json_is_reported() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/match")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_nearby_blood_banks_within_radius() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-bloodbanks")
        .set_json(json!({ "latitude": 12.9716, "longitude": 77.5946 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["searchExpanded"], false);
    let banks = body["nearestBloodBanks"].as_array().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0]["id"], LIFELINE_ID);
}

#[actix_web::test]
async fn test_nearby_blood_banks_expands_when_none_in_range() {
    let app = init_app!();

    // Mysore is well outside the emergency radius of both seeded banks
    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-bloodbanks")
        .set_json(json!({ "latitude": 12.2958, "longitude": 76.6394 }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["searchExpanded"], true);
    let banks = body["nearestBloodBanks"].as_array().unwrap();
    assert_eq!(banks.len(), 2);
    assert_eq!(banks[0]["id"], LIFELINE_ID);
    assert!(banks[0]["distanceKm"].as_f64().unwrap() < banks[1]["distanceKm"].as_f64().unwrap());
}

#[actix_web::test]
async fn test_nearby_donors_by_blood_type() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-donors")
        .set_json(json!({ "latitude": 12.9716, "longitude": 77.5946, "bloodType": "O-" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["donors"].as_array().unwrap().len(), 1);
    assert_eq!(body["donors"][0]["id"], ASHA_DONOR_ID);

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-donors")
        .set_json(json!({ "latitude": 12.9716, "longitude": 77.5946, "bloodType": "AB+" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["donors"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_emergency_request_reaches_nearby_donor() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/request")
        .set_json(emergency_request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = test::read_body_json(resp).await;
    let request_id = created["requestId"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donors/{}/incoming-requests", ASHA_DONOR_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 1);
    assert_eq!(body["serviceRadius"], 15.0);
    assert_eq!(body["requests"][0]["id"], request_id.as_str());
}

#[actix_web::test]
async fn test_incoming_requests_are_capped_and_radius_bound() {
    let app = init_app!();

    for i in 0..12 {
        let mut body = emergency_request_body();
        body["latitude"] = json!(12.9300 + i as f64 * 0.001);
        body["patientName"] = json!(format!("Patient {}", i));
        let req = test::TestRequest::post()
            .uri("/api/v1/emergency/request")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // About 16km north of Asha, just past her 15km service radius
    let mut outside = emergency_request_body();
    outside["latitude"] = json!(13.0791);
    outside["longitude"] = json!(77.6245);
    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/request")
        .set_json(outside)
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let outside_id = created["requestId"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donors/{}/incoming-requests", ASHA_DONOR_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 12);
    let requests = body["requests"].as_array().unwrap();
    assert_eq!(requests.len(), 10);
    assert!(requests.iter().all(|r| r["id"] != outside_id.as_str()));

    let distances: Vec<f64> = requests
        .iter()
        .map(|r| r["rawDistanceKm"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(distances.iter().all(|d| *d <= 15.0));
}

#[actix_web::test]
async fn test_request_status_is_final() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/request")
        .set_json(emergency_request_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let request_id = created["requestId"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/requests/{}/status", request_id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "status": "accepted" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "status": "rejected" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_duplicate_donor_registration_conflicts() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/donors")
        .set_json(json!({
            "name": "Asha Again",
            "email": "ASHA.RAO@example.com",
            "mobileNumber": "9845000777",
            "bloodType": "B+",
            "emergencyContactMobile": "9845000778",
            "credential": { "kind": "password", "hash": "hashed" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_register_donor_then_opt_in() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/donors")
        .set_json(json!({
            "name": "Vikram Shah",
            "email": "vikram@example.com",
            "mobileNumber": "9845000555",
            "bloodType": "O-",
            "emergencyContactMobile": "9845000556",
            "age": 31,
            "credential": { "kind": "password", "hash": "hashed" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let donor_id = created["donor"]["id"].as_str().unwrap().to_string();

    // Not opted in yet
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donors/{}/incoming-requests", donor_id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Critical service is disabled");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/donors/{}/critical-status", donor_id))
        .set_json(json!({
            "isCriticalReady": true,
            "criticalServiceRadiusKm": 30.0,
            "latitude": 12.9716,
            "longitude": 77.5946
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-donors")
        .set_json(json!({ "latitude": 12.9716, "longitude": 77.5946, "bloodType": "O-" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let donors = body["donors"].as_array().unwrap();
    assert_eq!(donors.len(), 2);
    assert_eq!(donors[0]["id"], donor_id.as_str());
}

#[actix_web::test]
async fn test_role_selection_happens_once() {
    let app = init_app!();
    let uri = format!("/api/v1/accounts/{}/role", VISITOR_ACCOUNT_ID);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "role": "hospital" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["account"]["role"], "hospital");

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "role": "user" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_inventory_update_changes_stock_filter() {
    let app = init_app!();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/bloodbanks/{}/inventory", LIFELINE_ID))
        .set_json(json!({ "bloodType": "O-", "unitsAvailable": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/nearby-bloodbanks")
        .set_json(json!({
            "latitude": 12.9716,
            "longitude": 77.5946,
            "bloodType": "O-",
            "inStockOnly": true
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["nearestBloodBanks"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_unknown_donor_is_not_found() {
    let app = init_app!();

    let req = test::TestRequest::get()
        .uri("/api/v1/donors/00000000-0000-4000-8000-000000000000/incoming-requests")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

fn hospital_body(email: &str) -> Value {
    json!({
        "name": "St. John's Medical College Hospital",
        "address": "Sarjapur Road, Koramangala",
        "latitude": 12.9300,
        "longitude": 77.6200,
        "contactNumber": "08022065000",
        "email": email,
        "credential": { "kind": "password", "hash": "hashed" }
    })
}

#[actix_web::test]
async fn test_hospital_patient_request_reaches_nearby_donor() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/hospitals")
        .set_json(hospital_body("desk@stjohns.example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["account"]["role"], "hospital");
    let hospital_id = created["hospital"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/hospitals/{}/patient-requests", hospital_id))
        .set_json(json!({
            "bloodType": "O-",
            "unitsRequired": 3,
            "patientName": "M. Iyer",
            "patientCondition": "Road traffic accident"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    let request_id = created["request"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["request"]["urgency"], "critical");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donors/{}/incoming-requests", ASHA_DONOR_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["total"], 1);
    let incoming = &body["requests"][0];
    assert_eq!(incoming["id"], request_id.as_str());
    assert_eq!(incoming["payload"]["urgency"], "critical");
    assert_eq!(incoming["payload"]["hospitalId"], hospital_id.as_str());
    assert_eq!(incoming["payload"]["hospitalLocation"], "Sarjapur Road, Koramangala");
}

#[actix_web::test]
async fn test_hospital_profile_update() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/hospitals")
        .set_json(hospital_body("front@stjohns.example.com"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let hospital_id = created["hospital"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/hospitals/{}", hospital_id);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "contactNumber": "08022065001" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&uri)
        .set_json(json!({ "latitude": 12.95 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get().uri(&uri).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hospital"]["contactNumber"], "08022065001");
    assert_eq!(body["hospital"]["address"], "Sarjapur Road, Koramangala");
    assert_eq!(body["hospital"]["location"]["latitude"], 12.93);

    let req = test::TestRequest::get().uri("/api/v1/hospitals").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["hospitals"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_normal_requests_are_for_hospitals() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/requests")
        .set_json(json!({
            "requestedBy": ASHA_ACCOUNT_ID,
            "bloodbankId": LIFELINE_ID,
            "bloodType": "O+",
            "unitsRequired": 2,
            "requestType": "normal"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri("/api/v1/hospitals")
        .set_json(hospital_body("stores@stjohns.example.com"))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let hospital_account = created["account"]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/api/v1/requests")
        .set_json(json!({
            "requestedBy": hospital_account,
            "bloodbankId": LIFELINE_ID,
            "bloodType": "O+",
            "unitsRequired": 4
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["request"]["requestType"], "normal");
    assert_eq!(created["request"]["urgency"], "routine");

    // Routine requests stay out of the donor feed
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donors/{}/incoming-requests", ASHA_DONOR_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 0);

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/request")
        .set_json(emergency_request_body())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/bloodbanks/{}/requests", LIFELINE_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 2);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/api/v1/bloodbanks/{}/requests?requestType=normal&status=pending",
            LIFELINE_ID
        ))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["requests"][0]["requestedBy"], hospital_account.as_str());
}

#[actix_web::test]
async fn test_accept_without_stock_conflicts() {
    let app = init_app!();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/bloodbanks/{}/inventory", LIFELINE_ID))
        .set_json(json!({ "bloodType": "O-", "unitsAvailable": 1 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/v1/emergency/request")
        .set_json(emergency_request_body())
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let request_id = created["requestId"].as_str().unwrap().to_string();

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/requests/{}/status", request_id))
        .set_json(json!({ "status": "accepted" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Insufficient stock");
}

#[actix_web::test]
async fn test_donation_increments_total() {
    let app = init_app!();

    let req = test::TestRequest::post()
        .uri("/api/v1/donations")
        .set_json(json!({
            "donorId": ASHA_DONOR_ID,
            "bloodbankId": LIFELINE_ID,
            "bloodType": "O-",
            "unitsDonated": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["totalDonations"], 5);

    let req = test::TestRequest::post()
        .uri("/api/v1/donations")
        .set_json(json!({
            "donorId": ASHA_DONOR_ID,
            "bloodbankId": LIFELINE_ID,
            "bloodType": "A+",
            "unitsDonated": 1
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/donations?donorId={}", ASHA_DONOR_ID))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["donations"][0]["bloodbankId"], LIFELINE_ID);
}
