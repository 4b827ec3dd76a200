use friendkit_api::models::{
    Comment, DeleteResult, EngagementPayload, InsertResult, Post, UpdateOutcome, UpdateResult,
    UpsertResult, User,
};
use serde_json::json;

// --- Wire shape of stored documents ---

#[test]
fn test_post_flattens_fields_next_to_id() {
    let post: Post = serde_json::from_value(json!({
        "_id": "p1",
        "title": "Bike",
        "seller": { "email": "a@x.com" }
    }))
    .unwrap();

    assert_eq!(post.id, "p1");
    assert_eq!(post.seller_email(), Some("a@x.com"));
    assert!(!post.fields.contains_key("_id"));

    let value = serde_json::to_value(&post).unwrap();
    assert_eq!(value["_id"], json!("p1"));
    assert_eq!(value["title"], json!("Bike"));
}

#[test]
fn test_seller_email_requires_a_string() {
    let post = Post::new("p1", json!({ "seller": { "email": 7 } }).as_object().cloned().unwrap());

    assert_eq!(post.seller_email(), None);
}

#[test]
fn test_user_path_email_wins() {
    let body = json!({ "email": "body@x.com", "_id": "x", "name": "A" });
    let user = User::new("path@x.com", body.as_object().cloned().unwrap());

    assert_eq!(
        serde_json::to_value(&user).unwrap(),
        json!({ "email": "path@x.com", "name": "A" })
    );
}

#[test]
fn test_comment_keeps_target_post_id_inside() {
    let comment = Comment {
        id: "c1".to_string(),
        comment: serde_json::from_value(json!({ "_id": "p1", "text": "hi" })).unwrap(),
    };

    assert_eq!(
        serde_json::to_value(&comment).unwrap(),
        json!({ "_id": "c1", "comment": { "_id": "p1", "text": "hi" } })
    );
}

#[test]
fn test_engagement_payload_requires_target() {
    let missing = serde_json::from_value::<EngagementPayload>(json!({ "text": "hi" }));
    assert!(missing.is_err());

    let numeric = serde_json::from_value::<EngagementPayload>(json!({ "_id": 5 }));
    assert!(numeric.is_err());
}

// --- Result reports ---

#[test]
fn test_result_reports_use_camel_case() {
    assert_eq!(
        serde_json::to_value(InsertResult::new("p1")).unwrap(),
        json!({ "acknowledged": true, "insertedId": "p1" })
    );
    assert_eq!(
        serde_json::to_value(UpsertResult::inserted("a@x.com")).unwrap(),
        json!({
            "acknowledged": true,
            "matchedCount": 0,
            "modifiedCount": 0,
            "upsertedCount": 1,
            "upsertedId": "a@x.com"
        })
    );
    assert_eq!(
        serde_json::to_value(DeleteResult { acknowledged: true, deleted_count: 0 }).unwrap(),
        json!({ "acknowledged": true, "deletedCount": 0 })
    );
}

#[test]
fn test_replaced_upsert_has_null_upserted_id() {
    let value = serde_json::to_value(UpsertResult::replaced(true)).unwrap();

    assert_eq!(value["matchedCount"], json!(1));
    assert_eq!(value["modifiedCount"], json!(1));
    assert_eq!(value["upsertedId"], json!(null));
}

#[test]
fn test_update_outcome_omits_absent_fields() {
    assert_eq!(
        serde_json::to_value(UpdateOutcome::updated()).unwrap(),
        json!({ "success": true, "message": "Update Succesfully" })
    );
    assert_eq!(
        serde_json::to_value(UpdateOutcome::failed("boom")).unwrap(),
        json!({ "success": false, "error": "boom" })
    );
}

#[test]
fn test_update_outcome_from_unmatched_result() {
    let miss = UpdateResult {
        acknowledged: true,
        matched_count: 0,
        modified_count: 0,
    };
    let unchanged = UpdateResult {
        matched_count: 1,
        ..miss.clone()
    };

    assert_eq!(
        UpdateOutcome::from(miss),
        UpdateOutcome::failed("could not Update the product")
    );
    // A matched but identical patch still counts as a successful update.
    assert_eq!(UpdateOutcome::from(unchanged), UpdateOutcome::updated());
}
