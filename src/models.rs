use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use ts_rs::TS;
use utoipa::{
    PartialSchema, ToSchema,
    openapi::{
        Ref, RefOr,
        schema::{AdditionalProperties, ObjectBuilder, Schema, Type},
    },
};

/// The open, client-defined part of every stored document.
pub type Document = Map<String, Value>;

// --- Stored Documents ---
//
// Each collection has a small fixed envelope (identity and join keys) plus an
// opaque `Document` bag flattened next to it, so the JSON shape the client sent
// is the JSON shape it reads back.

/// User
///
/// A profile document keyed by `email`. Everything else is whatever the client
/// supplied on the last upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct User {
    pub email: String,
    #[serde(flatten)]
    pub profile: Document,
}

impl User {
    /// Builds the stored form of a profile. The path email is authoritative, so any
    /// `email` or `_id` inside the body is dropped.
    pub fn new(email: impl Into<String>, mut profile: Document) -> Self {
        profile.remove("email");
        profile.remove("_id");
        Self {
            email: email.into(),
            profile,
        }
    }
}

/// Post
///
/// A content document. `seller.email` inside `fields` is the ownership key used by
/// the seller-scoped listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: Document,
}

impl Post {
    /// Wraps client fields under a store-assigned id. A client `_id` never survives.
    pub fn new(id: impl Into<String>, mut fields: Document) -> Self {
        fields.remove("_id");
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn seller_email(&self) -> Option<&str> {
        seller_email(&self.fields)
    }
}

/// Reads `seller.email` out of a post body.
pub fn seller_email(fields: &Document) -> Option<&str> {
    fields.get("seller")?.get("email")?.as_str()
}

/// EngagementPayload
///
/// The client body of a comment or like. Its `_id` is the **target post id**, not
/// the id of the engagement record; listing by post filters on this field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EngagementPayload {
    #[serde(rename = "_id")]
    pub post_id: String,
    #[serde(flatten)]
    pub body: Document,
}

/// Comment
///
/// Stored as `{ _id, comment: { _id: <post id>, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub comment: EngagementPayload,
}

/// Like
///
/// Stored as `{ _id, like: { _id: <post id>, ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Like {
    #[serde(rename = "_id")]
    pub id: String,
    pub like: EngagementPayload,
}

// --- Store Results (Output Schemas) ---
//
// Field names follow the document store's own reports so existing clients keep
// reading `insertedId`, `matchedCount`, `deletedCount` and friends.

/// InsertResult
///
/// Returned by every create/append operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InsertResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertResult {
    pub fn new(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// UpsertResult
///
/// Outcome of the user upsert. `upsertedId` carries the email when the profile
/// was created rather than replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpsertResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

impl UpsertResult {
    pub fn inserted(key: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(key.into()),
        }
    }

    pub fn replaced(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }
}

/// UpdateResult
///
/// Raw outcome of a post patch. `matchedCount == 0` means no post had that id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// DeleteResult
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DeleteResult {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

// --- API Responses ---

/// SaveUserResponse
///
/// Response of `PUT /user/{email}`: the upsert report plus a freshly minted token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SaveUserResponse {
    pub result: UpsertResult,
    pub token: String,
}

/// UpdateOutcome
///
/// Response of `PUT /post/{id}`. A miss or a store failure is reported here with
/// `success: false`, never as a transport error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpdateOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
}

impl UpdateOutcome {
    pub fn updated() -> Self {
        Self {
            success: true,
            message: Some("Update Succesfully".to_string()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

impl From<UpdateResult> for UpdateOutcome {
    fn from(result: UpdateResult) -> Self {
        if result.matched_count > 0 {
            Self::updated()
        } else {
            Self::failed("could not Update the product")
        }
    }
}

// --- OpenAPI schemas for the open documents ---
//
// The flattened bags are free-form, so these are described by hand: the fixed
// envelope fields plus `additionalProperties: true`.

fn string_schema(description: &str) -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(Type::String)
        .description(Some(description))
}

fn open_object() -> ObjectBuilder {
    ObjectBuilder::new()
        .schema_type(Type::Object)
        .additional_properties(Some(AdditionalProperties::FreeForm(true)))
}

impl PartialSchema for User {
    fn schema() -> RefOr<Schema> {
        open_object()
            .property("email", string_schema("Unique identity key"))
            .required("email")
            .into()
    }
}

impl ToSchema for User {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("User")
    }
}

impl PartialSchema for Post {
    fn schema() -> RefOr<Schema> {
        open_object()
            .property("_id", string_schema("Store-assigned post id"))
            .property(
                "seller",
                open_object().property("email", string_schema("Owner email")),
            )
            .required("_id")
            .into()
    }
}

impl ToSchema for Post {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Post")
    }
}

impl PartialSchema for EngagementPayload {
    fn schema() -> RefOr<Schema> {
        open_object()
            .property("_id", string_schema("Target post id"))
            .required("_id")
            .into()
    }
}

impl ToSchema for EngagementPayload {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("EngagementPayload")
    }
}

impl PartialSchema for Comment {
    fn schema() -> RefOr<Schema> {
        ObjectBuilder::new()
            .schema_type(Type::Object)
            .property("_id", string_schema("Comment id"))
            .property("comment", Ref::from_schema_name("EngagementPayload"))
            .required("_id")
            .required("comment")
            .into()
    }
}

impl ToSchema for Comment {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Comment")
    }
}

impl PartialSchema for Like {
    fn schema() -> RefOr<Schema> {
        ObjectBuilder::new()
            .schema_type(Type::Object)
            .property("_id", string_schema("Like id"))
            .property("like", Ref::from_schema_name("EngagementPayload"))
            .required("_id")
            .required("like")
            .into()
    }
}

impl ToSchema for Like {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Like")
    }
}
