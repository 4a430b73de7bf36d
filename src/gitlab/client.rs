use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{Author, MergeRequest, Tag};
use crate::error::{ChangelogError, Result};
use crate::gitlab::{GitLabApi, ProjectRef};
use crate::timestamp;

const PER_PAGE: u32 = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct ApiNamespace {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiProject {
    id: u64,
    name: String,
    namespace: ApiNamespace,
}

#[derive(Debug, Deserialize)]
struct ApiCommit {
    created_at: String,
}

#[derive(Debug, Deserialize)]
struct ApiTag {
    name: String,
    commit: ApiCommit,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
    name: String,
    web_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiReferences {
    short: String,
}

#[derive(Debug, Deserialize)]
struct ApiMergeRequest {
    iid: u64,
    title: String,
    /// Deprecated by GitLab in favour of `references`, still sent by older instances
    #[serde(default)]
    reference: Option<String>,
    #[serde(default)]
    references: Option<ApiReferences>,
    web_url: String,
    author: ApiUser,
    #[serde(default)]
    merged_at: Option<String>,
    #[serde(default)]
    labels: Vec<String>,
}

/// GitLab error payload; `message` is either text or a field-to-errors map
#[derive(Debug, Deserialize)]
struct ApiError {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiMessage {
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl ApiTag {
    fn into_tag(self) -> Result<Tag> {
        let created_at = timestamp::parse(&self.commit.created_at)?;
        Ok(Tag::new(self.name, created_at))
    }
}

impl ApiMergeRequest {
    /// Convert to the domain type; `None` when GitLab has no merge time recorded
    fn into_merge_request(self) -> Result<Option<MergeRequest>> {
        let Some(merged_at) = self.merged_at.as_deref() else {
            return Ok(None);
        };
        let merged_at = timestamp::parse(merged_at)?;

        let reference = self
            .references
            .map(|r| r.short)
            .or(self.reference)
            .unwrap_or_else(|| format!("!{}", self.iid));

        let merge_request = MergeRequest::new(
            self.title,
            reference,
            self.web_url,
            Author::new(self.author.name, self.author.web_url),
            merged_at,
        )
        .with_labels(self.labels);
        Ok(Some(merge_request))
    }
}

/// GitLab REST API v4 client
pub struct GitLabClient {
    http: Client,
    api_url: String,
}

impl GitLabClient {
    /// Create a client for the instance at `host` (e.g. `https://gitlab.com`)
    ///
    /// # Arguments
    /// * `host` - Base URL of the GitLab instance
    /// * `private_token` - Personal access token sent as `PRIVATE-TOKEN`, if any
    pub fn new(host: &str, private_token: Option<&str>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(token) = private_token {
            let mut value = HeaderValue::from_str(token).map_err(|_| {
                ChangelogError::config("private token contains characters not allowed in a header")
            })?;
            value.set_sensitive(true);
            headers.insert("private-token", value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(concat!("gitlab-changelog/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(GitLabClient {
            http,
            api_url: api_url(host),
        })
    }

    /// Fetch one page of a list endpoint, with the number of the page after it.
    fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        page: u32,
    ) -> Result<(Vec<T>, Option<u32>)> {
        let url = format!("{}{}", self.api_url, path);
        debug!(%url, page, "GET");
        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("per_page", PER_PAGE), ("page", page)])
            .send()?;
        let response = check_status(response, path)?;
        let following = next_page(&response).filter(|next| *next > page);

        let batch: Vec<T> = response.json()?;
        Ok((batch, following))
    }

    /// Fetch every page of a list endpoint.
    fn get_all<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = Some(1);

        while let Some(current) = page {
            let (mut batch, following) = self.get_page(path, query, current)?;
            items.append(&mut batch);
            page = following;
        }

        Ok(items)
    }
}

impl GitLabApi for GitLabClient {
    fn find_project(&self, group: &str, name: &str) -> Result<ProjectRef> {
        let query = [("search", name.to_string())];
        let mut page = Some(1);

        // Search results can run to many pages; stop at the first exact match
        while let Some(current) = page {
            let (candidates, following): (Vec<ApiProject>, _) =
                self.get_page("/projects", &query, current)?;
            debug!(count = candidates.len(), page = current, name, "project search results");

            if let Some(found) = candidates
                .into_iter()
                .find(|p| p.namespace.name == group && p.name == name)
            {
                return Ok(ProjectRef::new(found.id, found.namespace.name, found.name));
            }
            page = following;
        }

        Err(ChangelogError::ProjectNotFound(format!("{}/{}", group, name)))
    }

    fn list_tags(&self, project: &ProjectRef) -> Result<Vec<Tag>> {
        let path = format!("/projects/{}/repository/tags", project.id);
        let tags: Vec<ApiTag> = self.get_all(
            &path,
            &[
                ("order_by", "updated".to_string()),
                ("sort", "desc".to_string()),
            ],
        )?;
        tags.into_iter().map(ApiTag::into_tag).collect()
    }

    fn list_merged_merge_requests(
        &self,
        project: &ProjectRef,
        target_branch: Option<&str>,
    ) -> Result<Vec<MergeRequest>> {
        let path = format!("/projects/{}/merge_requests", project.id);
        let mut query = vec![("state", "merged".to_string())];
        if let Some(branch) = target_branch {
            query.push(("target_branch", branch.to_string()));
        }

        let raw: Vec<ApiMergeRequest> = self.get_all(&path, &query)?;
        let mut merged = Vec::with_capacity(raw.len());
        for api_mr in raw {
            let iid = api_mr.iid;
            match api_mr.into_merge_request()? {
                Some(mr) => merged.push(mr),
                None => warn!(iid, "merged merge request has no merge time; skipping"),
            }
        }
        Ok(merged)
    }
}

fn api_url(host: &str) -> String {
    format!("{}/api/v4", host.trim_end_matches('/'))
}

fn next_page(response: &Response) -> Option<u32> {
    response
        .headers()
        .get("x-next-page")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn check_status(response: Response, path: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let detail = response
        .json::<ApiError>()
        .ok()
        .and_then(|e| match e.message {
            ApiMessage::Text(text) => Some(text),
            ApiMessage::Other(_) => None,
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    Err(ChangelogError::api(format!(
        "GET {} returned {}: {}",
        path,
        status.as_u16(),
        detail
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::runtime::Runtime;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "glpat-test-token";

    /// The blocking client must run outside the runtime that serves the mocks
    fn start_server() -> (Runtime, MockServer) {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        let server = runtime.block_on(MockServer::start());
        (runtime, server)
    }

    fn client_for(server: &MockServer) -> GitLabClient {
        GitLabClient::new(&server.uri(), Some(TOKEN)).unwrap()
    }

    fn project() -> ProjectRef {
        ProjectRef::new(7, "acme", "app")
    }

    fn api_tag(name: &str, created_at: &str) -> serde_json::Value {
        json!({"name": name, "commit": {"id": "abc", "created_at": created_at}})
    }

    fn api_merge_request(iid: u64, merged_at: Option<&str>, labels: &[&str]) -> serde_json::Value {
        json!({
            "iid": iid,
            "title": format!("Change {}", iid),
            "references": {"short": format!("!{}", iid)},
            "web_url": format!("https://gitlab.example.com/acme/app/-/merge_requests/{}", iid),
            "author": {"name": "Ada", "web_url": "https://gitlab.example.com/ada"},
            "merged_at": merged_at,
            "labels": labels,
        })
    }

    fn api_project(id: u64, namespace: &str, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "namespace": {"name": namespace}})
    }

    #[test]
    fn test_api_url_trims_trailing_slash() {
        assert_eq!(api_url("https://gitlab.com/"), "https://gitlab.com/api/v4");
        assert_eq!(api_url("https://git.acme.io"), "https://git.acme.io/api/v4");
    }

    #[test]
    fn test_tag_payload_conversion() {
        let payload = r#"{
            "name": "v1.2.0",
            "message": null,
            "commit": {
                "id": "2695effb5807a22ff3d138d593fd856244e155e7",
                "created_at": "2024-02-01T10:00:00.000+01:00"
            }
        }"#;
        let api_tag: ApiTag = serde_json::from_str(payload).unwrap();
        let tag = api_tag.into_tag().unwrap();
        assert_eq!(tag.name, "v1.2.0");
        assert_eq!(
            tag.commit_created_at,
            timestamp::parse("2024-02-01T09:00:00.000Z").unwrap()
        );
    }

    #[test]
    fn test_tag_payload_with_bad_timestamp() {
        let payload = r#"{"name": "v1", "commit": {"created_at": "last tuesday"}}"#;
        let api_tag: ApiTag = serde_json::from_str(payload).unwrap();
        assert!(matches!(
            api_tag.into_tag(),
            Err(ChangelogError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_merge_request_payload_conversion() {
        let payload = r#"{
            "id": 1001,
            "iid": 42,
            "title": "Add dark mode",
            "state": "merged",
            "references": {"short": "!42", "relative": "!42", "full": "acme/app!42"},
            "web_url": "https://gitlab.com/acme/app/-/merge_requests/42",
            "author": {"id": 5, "name": "Ada", "username": "ada", "web_url": "https://gitlab.com/ada"},
            "merged_at": "2024-01-15T08:30:00.000Z",
            "labels": ["feature", "ui"]
        }"#;
        let api_mr: ApiMergeRequest = serde_json::from_str(payload).unwrap();
        let mr = api_mr.into_merge_request().unwrap().unwrap();

        assert_eq!(mr.title, "Add dark mode");
        assert_eq!(mr.reference, "!42");
        assert_eq!(mr.author.name, "Ada");
        assert_eq!(mr.author.web_url, "https://gitlab.com/ada");
        assert!(mr.has_label("feature"));
        assert!(mr.has_label("ui"));
    }

    #[test]
    fn test_merge_request_reference_fallbacks() {
        let legacy = r#"{"iid": 7, "title": "t", "reference": "!7",
            "web_url": "u", "author": {"name": "a", "web_url": "w"},
            "merged_at": "2024-01-15T08:30:00.000Z"}"#;
        let mr = serde_json::from_str::<ApiMergeRequest>(legacy)
            .unwrap()
            .into_merge_request()
            .unwrap()
            .unwrap();
        assert_eq!(mr.reference, "!7");
        assert!(mr.labels.is_empty());

        let bare = r#"{"iid": 8, "title": "t", "web_url": "u",
            "author": {"name": "a", "web_url": "w"},
            "merged_at": "2024-01-15T08:30:00.000Z"}"#;
        let mr = serde_json::from_str::<ApiMergeRequest>(bare)
            .unwrap()
            .into_merge_request()
            .unwrap()
            .unwrap();
        assert_eq!(mr.reference, "!8");
    }

    #[test]
    fn test_merge_request_without_merge_time_is_skipped() {
        let payload = r#"{"iid": 9, "title": "t", "web_url": "u",
            "author": {"name": "a", "web_url": "w"}, "merged_at": null}"#;
        let api_mr: ApiMergeRequest = serde_json::from_str(payload).unwrap();
        assert!(api_mr.into_merge_request().unwrap().is_none());
    }

    #[test]
    fn test_client_accepts_token() {
        assert!(GitLabClient::new("https://gitlab.com", Some("glpat-abc123")).is_ok());
    }

    #[test]
    fn test_client_rejects_invalid_token() {
        assert!(matches!(
            GitLabClient::new("https://gitlab.com", Some("bad\ntoken")),
            Err(ChangelogError::Config(_))
        ));
    }

    #[test]
    fn test_list_tags_follows_next_page_header() {
        let (runtime, server) = start_server();
        let tags_path = "/api/v4/projects/7/repository/tags";

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path(tags_path))
                .and(header("private-token", TOKEN))
                .and(query_param("per_page", "100"))
                .and(query_param("page", "1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([
                            api_tag("v3", "2024-03-01T00:00:00.000Z"),
                            api_tag("v2", "2024-02-01T00:00:00.000Z"),
                        ]))
                        .insert_header("X-Next-Page", "2"),
                )
                .expect(1)
                .mount(&server),
        );
        runtime.block_on(
            Mock::given(method("GET"))
                .and(path(tags_path))
                .and(header("private-token", TOKEN))
                .and(query_param("page", "2"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([api_tag("v1", "2024-01-01T00:00:00.000Z")]))
                        .insert_header("X-Next-Page", ""),
                )
                .expect(1)
                .mount(&server),
        );

        let tags = client_for(&server).list_tags(&project()).unwrap();

        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["v3", "v2", "v1"]);
        assert_eq!(
            tags[2].commit_created_at,
            timestamp::parse("2024-01-01T00:00:00.000Z").unwrap()
        );
    }

    #[test]
    fn test_list_merged_merge_requests_pages_and_filters() {
        let (runtime, server) = start_server();
        let mr_path = "/api/v4/projects/7/merge_requests";

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path(mr_path))
                .and(query_param("state", "merged"))
                .and(query_param("target_branch", "main"))
                .and(query_param("page", "1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([
                            api_merge_request(3, Some("2024-01-20T00:00:00.000Z"), &["feature"]),
                            api_merge_request(2, None, &[]),
                        ]))
                        .insert_header("X-Next-Page", "2"),
                )
                .expect(1)
                .mount(&server),
        );
        runtime.block_on(
            Mock::given(method("GET"))
                .and(path(mr_path))
                .and(query_param("state", "merged"))
                .and(query_param("target_branch", "main"))
                .and(query_param("page", "2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                    api_merge_request(1, Some("2024-01-05T00:00:00.000+01:00"), &["bug"]),
                ])))
                .expect(1)
                .mount(&server),
        );

        let merged = client_for(&server)
            .list_merged_merge_requests(&project(), Some("main"))
            .unwrap();

        let references: Vec<&str> = merged.iter().map(|m| m.reference.as_str()).collect();
        assert_eq!(references, vec!["!3", "!1"]);
        assert!(merged[0].has_label("feature"));
        assert!(merged[1].has_label("bug"));
    }

    #[test]
    fn test_find_project_stops_at_first_match() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects"))
                .and(query_param("search", "app"))
                .and(query_param("page", "1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([
                            api_project(1, "acme", "app"),
                            api_project(2, "other", "app"),
                        ]))
                        .insert_header("X-Next-Page", "2"),
                )
                .expect(1)
                .mount(&server),
        );
        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects"))
                .and(query_param("page", "2"))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
                .expect(0)
                .mount(&server),
        );

        let found = client_for(&server).find_project("acme", "app").unwrap();

        assert_eq!(found, ProjectRef::new(1, "acme", "app"));
        let requests = runtime.block_on(server.received_requests()).unwrap();
        assert_eq!(requests.len(), 1);
    }

    #[test]
    fn test_find_project_on_later_page() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects"))
                .and(query_param("page", "1"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([api_project(2, "other", "app")]))
                        .insert_header("X-Next-Page", "2"),
                )
                .mount(&server),
        );
        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects"))
                .and(query_param("page", "2"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([api_project(9, "acme", "app")])),
                )
                .mount(&server),
        );

        let found = client_for(&server).find_project("acme", "app").unwrap();
        assert_eq!(found.id, 9);
    }

    #[test]
    fn test_find_project_not_found() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects"))
                .and(query_param("search", "app"))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(json!([api_project(2, "other", "app")])),
                )
                .mount(&server),
        );

        let err = client_for(&server).find_project("acme", "app").unwrap_err();
        assert_eq!(err.to_string(), "Project not found: acme/app");
    }

    #[test]
    fn test_error_payload_becomes_api_error() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects/7/repository/tags"))
                .respond_with(
                    ResponseTemplate::new(404)
                        .set_body_json(json!({"message": "404 Project Not Found"})),
                )
                .mount(&server),
        );

        let err = client_for(&server).list_tags(&project()).unwrap_err();
        match err {
            ChangelogError::Api(msg) => {
                assert_eq!(
                    msg,
                    "GET /projects/7/repository/tags returned 404: 404 Project Not Found"
                );
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_structured_error_payload_falls_back_to_status_reason() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects/7/merge_requests"))
                .respond_with(
                    ResponseTemplate::new(400)
                        .set_body_json(json!({"message": {"target_branch": ["is invalid"]}})),
                )
                .mount(&server),
        );

        let err = client_for(&server)
            .list_merged_merge_requests(&project(), Some("???"))
            .unwrap_err();
        assert!(matches!(err, ChangelogError::Api(_)));
        assert!(err.to_string().ends_with("returned 400: Bad Request"), "got: {}", err);
    }

    #[test]
    fn test_malformed_timestamp_in_response_fails() {
        let (runtime, server) = start_server();

        runtime.block_on(
            Mock::given(method("GET"))
                .and(path("/api/v4/projects/7/repository/tags"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!([api_tag("v1", "2024-01-01 00:00:00")])),
                )
                .mount(&server),
        );

        let err = client_for(&server).list_tags(&project()).unwrap_err();
        assert!(matches!(err, ChangelogError::MalformedTimestamp(_)));
    }
}
