#[cfg(test)]
mod test {
    use httpmock::Method::{DELETE, GET, POST, PUT};
    use httpmock::MockServer;
    use serde_json::json;
    use std::time::Duration;

    use crate::config::settings::TransportConfig;
    use crate::error::ErrorKind;
    use crate::transport::adapter::HttpTransport;
    use crate::transport::request::{ApiRequest, Payload, Verb};
    use crate::transport::response::ApiResult;

    fn transport() -> HttpTransport {
        HttpTransport::new(&TransportConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn get_never_sends_a_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/org/app/users/alice").body("");
                then.status(200).json_body(json!({"entities": [{"username": "alice"}]}));
            })
            .await;

        let request = ApiRequest::new(server.url("/org/app/users/alice"), Verb::Get)
            .payload(Payload::Bytes(br#"{"ignored":true}"#.to_vec()));
        let result = transport().execute(request).await.unwrap();

        assert_eq!(result.as_json().unwrap()["entities"][0]["username"], "alice");
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn put_and_delete_carry_the_body() {
        let server = MockServer::start_async().await;
        let put = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/org/app/users/alice")
                    .json_body(json!({"nickname": "Al"}));
                then.status(200).json_body(json!({"action": "put"}));
            })
            .await;
        let delete = server
            .mock_async(|when, then| {
                when.method(DELETE)
                    .path("/org/app/chatgroups/g1/blocks/users")
                    .json_body(json!({"usernames": ["bob", "eve"]}));
                then.status(200).json_body(json!({"action": "delete"}));
            })
            .await;

        let transport = transport();
        let put_result = transport
            .execute(
                ApiRequest::new(server.url("/org/app/users/alice"), Verb::Put)
                    .header("Content-Type:application/json")
                    .payload(Payload::json(&json!({"nickname": "Al"})).unwrap()),
            )
            .await
            .unwrap();
        let delete_result = transport
            .execute(
                ApiRequest::new(server.url("/org/app/chatgroups/g1/blocks/users"), Verb::Delete)
                    .header("Content-Type:application/json")
                    .payload(Payload::json(&json!({"usernames": ["bob", "eve"]})).unwrap()),
            )
            .await
            .unwrap();

        assert_eq!(put_result, ApiResult::Json(json!({"action": "put"})));
        assert_eq!(delete_result, ApiResult::Json(json!({"action": "delete"})));
        assert_eq!(put.hits_async().await, 1);
        assert_eq!(delete.hits_async().await, 1);
    }

    #[tokio::test]
    async fn binary_body_is_returned_unchanged() {
        let png: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let server = MockServer::start_async().await;
        let expected = png.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET).path("/org/app/chatfiles/u1");
                then.status(200)
                    .header("Content-Type", "application/octet-stream")
                    .body(expected.clone());
            })
            .await;

        let result = transport()
            .execute(ApiRequest::new(server.url("/org/app/chatfiles/u1"), Verb::Get))
            .await
            .unwrap();
        assert_eq!(result, ApiResult::Raw(png));
    }

    #[tokio::test]
    async fn headers_are_sent_as_name_value_pairs() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/org/app/users/alice/deactivate")
                    .header("authorization", "Bearer T")
                    .header("restrict-access", "true");
                then.status(200).json_body(json!({"ok": true}));
            })
            .await;

        transport()
            .execute(
                ApiRequest::new(server.url("/org/app/users/alice/deactivate"), Verb::Post)
                    .headers(["Authorization:Bearer T", "restrict-access:true"]),
            )
            .await
            .unwrap();
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn malformed_header_line_is_rejected_before_sending() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.path("/x");
                then.status(200);
            })
            .await;

        let err = transport()
            .execute(ApiRequest::new(server.url("/x"), Verb::Get).header("NoColonHere"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(mock.hits_async().await, 0);
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_millis(800)).json_body(json!({"late": true}));
            })
            .await;

        let cfg = TransportConfig { timeout_ms: 100, ..TransportConfig::default() };
        let err = HttpTransport::new(&cfg)
            .unwrap()
            .execute(ApiRequest::new(server.url("/slow"), Verb::Get))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        let err = transport()
            .execute(ApiRequest::new("http://127.0.0.1:1/org/app/users", Verb::Get))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[tokio::test]
    async fn redirects_are_capped() {
        let server = MockServer::start_async().await;
        for hop in 0..5 {
            let next = format!("/hop{}", hop + 1);
            server
                .mock_async(move |when, then| {
                    when.method(GET).path(format!("/hop{}", hop));
                    then.status(302).header("Location", next.as_str());
                })
                .await;
        }
        server
            .mock_async(|when, then| {
                when.method(GET).path("/hop5");
                then.status(200).json_body(json!({"arrived": true}));
            })
            .await;

        let transport = transport();
        let near = transport
            .execute(ApiRequest::new(server.url("/hop2"), Verb::Get))
            .await
            .unwrap();
        assert_eq!(near, ApiResult::Json(json!({"arrived": true})));

        let far = transport
            .execute(ApiRequest::new(server.url("/hop0"), Verb::Get))
            .await
            .unwrap_err();
        assert_eq!(far.kind(), ErrorKind::Transport);
    }
}
