use httpmock::prelude::*;
use serde_json::json;
use std::fs;
use std::sync::Arc;

use spacetraveling::commands::generate::run_with_source;
use spacetraveling::config::SiteConfig;
use spacetraveling::content::{ContentClient, ContentSettings};
use spacetraveling::Blog;

fn summary_doc(uid: &str, title: &str) -> serde_json::Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2022-03-15T14:05:00+0000",
        "last_publication_date": "2022-03-15T14:05:00+0000",
        "data": { "title": title, "subtitle": "Subtitle", "author": "Ana Lima" }
    })
}

fn detail_doc(uid: &str, title: &str, last: &str) -> serde_json::Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": "2022-03-15T14:05:00+0000",
        "last_publication_date": last,
        "data": {
            "title": title,
            "subtitle": "Subtitle",
            "author": "Ana Lima",
            "banner": { "url": "https://images.example.com/banner.png" },
            "content": [
                { "heading": "Getting started", "body": [
                    { "type": "paragraph", "text": "First paragraph", "spans": [] },
                    { "type": "paragraph", "text": "Second paragraph", "spans": [] }
                ]}
            ]
        }
    })
}

fn mock_content_service(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET).path("/api/v2");
        then.status(200).json_body(json!({
            "refs": [{ "id": "master", "ref": "master-ref", "isMasterRef": true }]
        }));
    });

    // the service echoes the request's access token into next_page
    let list_next = server.url(
        "/api/v2/documents/search?ref=master-ref&access_token=SECRET-TOKEN&page=2&pageSize=2",
    );
    let list_last = server.url(
        "/api/v2/documents/search?ref=master-ref&access_token=SECRET-TOKEN&page=3&pageSize=2",
    );
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/documents/search")
            .query_param("q", r#"[[at(document.type, "posts")]]"#)
            .query_param("pageSize", "2");
        then.status(200).json_body(json!({
            "next_page": list_next,
            "results": [summary_doc("first-post", "First Post"), summary_doc("second-post", "Second Post")]
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/documents/search")
            .query_param("page", "2");
        then.status(200).json_body(json!({
            "next_page": list_last,
            "results": [summary_doc("third-post", "Third Post")]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/documents/search")
            .query_param("page", "3");
        then.status(200).json_body(json!({
            "next_page": null,
            "results": [summary_doc("fourth-post", "Fourth Post")]
        }));
    });

    server.mock(|when, then| {
        when.method(GET)
            .path("/api/v2/documents/search")
            .query_param("q", r#"[[at(document.type, "posts")]]"#)
            .query_param("pageSize", "100");
        then.status(200).json_body(json!({
            "next_page": null,
            "results": [
                summary_doc("first-post", "First Post"),
                summary_doc("second-post", "Second Post"),
                summary_doc("third-post", "Third Post"),
                summary_doc("fourth-post", "Fourth Post")
            ]
        }));
    });

    for (uid, title, last) in [
        ("first-post", "First Post", "2022-03-20T10:00:00+0000"),
        ("second-post", "Second Post", "2022-03-15T14:05:00+0000"),
        ("third-post", "Third Post", "2022-03-15T14:05:00+0000"),
        ("fourth-post", "Fourth Post", "2022-03-15T14:05:00+0000"),
    ] {
        let body = detail_doc(uid, title, last);
        server.mock(move |when, then| {
            when.method(GET)
                .path("/api/v2/documents/search")
                .query_param("q", format!(r#"[[at(my.posts.uid, "{}")]]"#, uid));
            then.status(200)
                .json_body(json!({ "next_page": null, "results": [body] }));
        });
    }
}

fn blog_in(dir: &std::path::Path) -> Blog {
    let config = SiteConfig {
        title: "Test Blog".to_string(),
        ..Default::default()
    };
    Blog::with_config(dir.to_path_buf(), config)
}

fn client_for(server: &MockServer) -> Arc<ContentClient> {
    let settings = ContentSettings::new(&server.url("/api/v2"), None).unwrap();
    Arc::new(ContentClient::new(settings).unwrap())
}

#[tokio::test]
async fn test_generate_writes_snapshot() {
    let server = MockServer::start();
    mock_content_service(&server);

    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("static/styles")).unwrap();
    fs::write(dir.path().join("static/styles/main.css"), "body {}").unwrap();

    let blog = blog_in(dir.path());
    let report = run_with_source(&blog, client_for(&server)).await.unwrap();

    assert_eq!(report.posts, 4);
    assert_eq!(report.list_pages, 2);
    assert!(report.skipped.is_empty());
    assert_eq!(report.assets, 1);

    let public = dir.path().join("public");
    assert!(public.join("styles/main.css").exists());
    assert!(public.join("404.html").exists());

    let index = fs::read_to_string(public.join("index.html")).unwrap();
    let first = index.find("First Post").unwrap();
    let second = index.find("Second Post").unwrap();
    assert!(first < second);
    // only the first page is rendered into the list
    assert!(!index.contains("Third Post"));
    assert!(index.contains("id=\"load-more\""));
    assert!(index.contains("15 Mar 2022"));
    assert!(index.contains("Ana Lima"));

    let edited = fs::read_to_string(public.join("post/first-post/index.html")).unwrap();
    assert!(edited.contains("<h1>First Post</h1>"));
    assert!(edited.contains("4 min"));
    assert!(edited.contains("First paragraph"));
    assert!(edited.contains("Second paragraph"));
    assert!(edited.contains("edited on 20 Mar 2022, at 10:00"));

    let unedited = fs::read_to_string(public.join("post/second-post/index.html")).unwrap();
    assert!(!unedited.contains("class=\"edited\""));

    assert!(public.join("post/third-post/index.html").exists());
    assert!(public.join("post/fourth-post/index.html").exists());
}

#[tokio::test]
async fn test_generate_writes_chained_list_pages() {
    let server = MockServer::start();
    mock_content_service(&server);

    let dir = tempfile::tempdir().unwrap();
    let blog = blog_in(dir.path());
    run_with_source(&blog, client_for(&server)).await.unwrap();

    let public = dir.path().join("public");
    let index = fs::read_to_string(public.join("index.html")).unwrap();
    assert!(index.contains("page-2.json"));
    assert!(!index.contains("SECRET-TOKEN"));
    assert!(!index.contains("documents%2Fsearch"));

    let page_two = fs::read_to_string(public.join("api/posts/page-2.json")).unwrap();
    assert!(!page_two.contains("SECRET-TOKEN"));
    let page_two: serde_json::Value = serde_json::from_str(&page_two).unwrap();
    assert_eq!(page_two["posts"][0]["uid"], "third-post");
    assert_eq!(page_two["posts"][0]["href"], "/post/third-post");
    assert_eq!(page_two["posts"][0]["published"], "15 Mar 2022");
    assert_eq!(page_two["next_page"], "/api/posts/page-3.json");

    let page_three: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(public.join("api/posts/page-3.json")).unwrap())
            .unwrap();
    assert_eq!(page_three["posts"][0]["uid"], "fourth-post");
    assert!(page_three["next_page"].is_null());
    assert!(!public.join("api/posts/page-4.json").exists());
}

#[tokio::test]
async fn test_generate_fails_when_service_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/v2");
        then.status(503);
    });

    let dir = tempfile::tempdir().unwrap();
    let blog = blog_in(dir.path());
    let result = run_with_source(&blog, client_for(&server)).await;

    assert!(result.is_err());
    assert!(!dir.path().join("public/index.html").exists());
}
