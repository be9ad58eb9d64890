use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::{EasemobError, Result};
use crate::transport::request::{split_header_line, ApiRequest, Payload, Verb};

/// Verb, path template and fixed headers of one provider operation.
/// Templates are relative to the app base URL; `{name}` marks a path param.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub verb: Verb,
    pub path: &'static str,
    pub headers: &'static [&'static str],
}

macro_rules! endpoints {
    ($( $variant:ident => $name:literal, $verb:ident, $path:literal $(, [$($header:literal),*])? ;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Endpoint {
            $( $variant, )*
        }

        impl Endpoint {
            pub const ALL: &'static [Endpoint] = &[$( Endpoint::$variant ),*];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Endpoint::$variant => $name, )*
                }
            }

            pub fn spec(&self) -> EndpointSpec {
                match self {
                    $( Endpoint::$variant => EndpointSpec {
                        verb: Verb::$verb,
                        path: $path,
                        headers: &[$($($header),*)?],
                    }, )*
                }
            }
        }
    };
}

endpoints! {
    // users
    CreateUser => "create_user", Post, "users";
    CreateUsers => "create_users", Post, "users";
    ResetPassword => "reset_password", Put, "users/{username}/password";
    GetUser => "get_user", Get, "users/{username}";
    GetUsers => "get_users", Get, "users";
    DeleteUser => "delete_user", Delete, "users/{username}";
    DeleteUsers => "delete_users", Delete, "users";
    EditNickname => "edit_nickname", Put, "users/{username}";
    AddFriend => "add_friend", Post, "users/{username}/contacts/users/{friend_name}", ["Content-Type:application/json"];
    DeleteFriend => "delete_friend", Delete, "users/{username}/contacts/users/{friend_name}";
    ShowFriends => "show_friends", Get, "users/{username}/contacts/users";
    GetBlacklist => "get_blacklist", Get, "users/{username}/blocks/users";
    AddUserForBlacklist => "add_user_for_blacklist", Post, "users/{username}/blocks/users";
    DeleteUserFromBlacklist => "delete_user_from_blacklist", Delete, "users/{username}/blocks/users/{blocked_name}";
    IsOnline => "is_online", Get, "users/{username}/status";
    GetOfflineMessages => "get_offline_messages", Get, "users/{username}/offline_msg_count";
    GetOfflineMessageStatus => "get_offline_message_status", Get, "users/{username}/offline_msg_status/{msg_id}";
    DeactivateUser => "deactivate_user", Post, "users/{username}/deactivate";
    ActivateUser => "activate_user", Post, "users/{username}/activate";
    DisconnectUser => "disconnect_user", Get, "users/{username}/disconnect";

    // files
    UploadFile => "upload_file", Upload, "chatfiles", ["restrict-access:true"];
    DownloadFile => "download_file", Get, "chatfiles/{uuid}", ["Accept:application/octet-stream"];
    DownloadThumbnail => "download_thumbnail", Get, "chatfiles/{uuid}", ["Accept:application/octet-stream", "thumbnail:true"];

    // messages
    SendMessage => "send_message", Post, "messages";

    // groups
    GetGroups => "get_groups", Get, "chatgroups";
    GetGroupDetail => "get_group_detail", Get, "chatgroups/{group_ids}";
    CreateGroup => "create_group", Post, "chatgroups";
    ModifyGroupInfo => "modify_group_info", Put, "chatgroups/{group_id}";
    ChangeGroupOwner => "change_group_owner", Put, "chatgroups/{group_id}";
    DeleteGroup => "delete_group", Delete, "chatgroups/{group_id}";
    GetGroupUsers => "get_group_users", Get, "chatgroups/{group_id}/users";
    AddGroupMember => "add_group_member", Post, "chatgroups/{group_id}/users/{username}", ["Content-Type:application/json"];
    AddGroupMembers => "add_group_members", Post, "chatgroups/{group_id}/users", ["Content-Type:application/json"];
    DeleteGroupMember => "delete_group_member", Delete, "chatgroups/{group_id}/users/{username}";
    DeleteGroupMembers => "delete_group_members", Delete, "chatgroups/{group_id}/users/{usernames}";
    GetGroupsForUser => "get_groups_for_user", Get, "users/{username}/joined_chatgroups";
    GetGroupBlacklist => "get_group_blacklist", Get, "chatgroups/{group_id}/blocks/users";
    AddGroupBlackMember => "add_group_black_member", Post, "chatgroups/{group_id}/blocks/users/{username}";
    AddGroupBlackMembers => "add_group_black_members", Post, "chatgroups/{group_id}/blocks/users";
    DeleteGroupBlackMember => "delete_group_black_member", Delete, "chatgroups/{group_id}/blocks/users/{username}";
    DeleteGroupBlackMembers => "delete_group_black_members", Delete, "chatgroups/{group_id}/blocks/users";

    // chat rooms
    CreateChatRoom => "create_chat_room", Post, "chatrooms";
    ModifyChatRoom => "modify_chat_room", Put, "chatrooms/{chatroom_id}";
    DeleteChatRoom => "delete_chat_room", Delete, "chatrooms/{chatroom_id}";
    GetChatRooms => "get_chat_rooms", Get, "chatrooms";
    GetChatRoomDetail => "get_chat_room_detail", Get, "chatrooms/{chatroom_id}";
    GetChatRoomJoined => "get_chat_room_joined", Get, "users/{username}/joined_chatrooms";
    AddChatRoomMember => "add_chat_room_member", Post, "chatrooms/{chatroom_id}/users/{username}", ["Content-Type:application/json"];
    AddChatRoomMembers => "add_chat_room_members", Post, "chatrooms/{chatroom_id}/users";
    DeleteChatRoomMember => "delete_chat_room_member", Delete, "chatrooms/{chatroom_id}/users/{username}";
    DeleteChatRoomMembers => "delete_chat_room_members", Delete, "chatrooms/{chatroom_id}/users/{usernames}";
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = EasemobError;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::ALL
            .iter()
            .find(|endpoint| endpoint.name() == s)
            .copied()
            .ok_or_else(|| EasemobError::Configuration(format!("unknown endpoint '{}'", s)))
    }
}

fn path_param_regex() -> &'static Regex {
    static PATH_PARAM: OnceLock<Regex> = OnceLock::new();
    PATH_PARAM.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("path param pattern"))
}

/// One invocation of an [`Endpoint`]: path params, query pairs, extra headers
/// and payload.
#[derive(Debug, Clone)]
pub struct Call {
    endpoint: Endpoint,
    params: HashMap<String, String>,
    query: Vec<(String, String)>,
    headers: Vec<String>,
    payload: Payload,
}

impl Call {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            params: HashMap::new(),
            query: Vec::new(),
            headers: Vec::new(),
            payload: Payload::Empty,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_owned(), value.to_string());
        self
    }

    /// Multi-value path param, joined with `,` as the provider expects.
    pub fn param_list<I, S>(self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|value| value.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.param(name, joined)
    }

    pub fn query(mut self, name: &str, value: impl ToString) -> Self {
        self.query.push((name.to_owned(), value.to_string()));
        self
    }

    pub fn header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        self.payload = Payload::json(body)?;
        Ok(self)
    }

    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Path with every `{name}` replaced by its param, inserted verbatim.
    pub fn render_path(&self) -> Result<String> {
        let template = self.endpoint.spec().path;
        let regex = path_param_regex();

        if let Some(missing) = regex
            .captures_iter(template)
            .filter_map(|caps| caps.get(1))
            .map(|name| name.as_str())
            .find(|name| !self.params.contains_key(*name))
        {
            return Err(EasemobError::MissingParam(missing.to_owned()));
        }

        let rendered = regex.replace_all(template, |caps: &regex::Captures| {
            self.params.get(&caps[1]).cloned().unwrap_or_default()
        });
        Ok(rendered.into_owned())
    }

    pub fn url(&self, base_url: &str) -> Result<String> {
        let raw = format!("{}{}", base_url, self.render_path()?);
        if self.query.is_empty() {
            return Ok(raw);
        }
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|err| EasemobError::Configuration(format!("invalid url '{}': {}", raw, err)))?;
        url.query_pairs_mut().extend_pairs(self.query.iter());
        Ok(url.into())
    }

    /// Request without credentials: endpoint headers, then call headers. JSON
    /// payloads get a content type unless one is already present; verbs
    /// without a body get none. Every header line is checked here so a bad
    /// call fails before a token is requested.
    pub(crate) fn into_request(self, base_url: &str) -> Result<ApiRequest> {
        let url = self.url(base_url)?;
        let spec = self.endpoint.spec();

        let mut headers = Vec::with_capacity(1 + spec.headers.len() + self.headers.len());
        headers.extend(spec.headers.iter().map(|line| line.to_string()));
        headers.extend(self.headers);
        for line in &headers {
            split_header_line(line)?;
        }

        let has_content_type = headers
            .iter()
            .any(|line| line.to_ascii_lowercase().starts_with("content-type:"));
        if spec.verb.carries_body()
            && matches!(self.payload, Payload::Bytes(_))
            && !self.payload.is_empty()
            && !has_content_type
        {
            headers.push("Content-Type:application/json".to_owned());
        }

        Ok(ApiRequest {
            url,
            verb: spec.verb,
            headers,
            payload: self.payload,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://a1.easemob.com/org/app/";

    #[test]
    fn names_are_unique_and_parse_back() {
        let mut seen = std::collections::HashSet::new();
        for endpoint in Endpoint::ALL {
            assert!(seen.insert(endpoint.name()), "duplicate {}", endpoint);
            assert_eq!(endpoint.name().parse::<Endpoint>().unwrap(), *endpoint);
        }
        assert!("nope".parse::<Endpoint>().is_err());
    }

    #[test]
    fn renders_nested_paths() {
        let call = Call::new(Endpoint::DeleteUserFromBlacklist)
            .param("username", "alice")
            .param("blocked_name", "bob");
        assert_eq!(call.url(BASE).unwrap(), format!("{BASE}users/alice/blocks/users/bob"));

        let call = Call::new(Endpoint::GetGroupDetail).param_list("group_ids", ["1", "2", "3"]);
        assert_eq!(call.render_path().unwrap(), "chatgroups/1,2,3");
    }

    #[test]
    fn missing_param_is_reported() {
        let err = Call::new(Endpoint::AddGroupMember)
            .param("group_id", "g1")
            .render_path()
            .unwrap_err();
        assert!(matches!(err, EasemobError::MissingParam(name) if name == "username"));
    }

    #[test]
    fn query_pairs_are_appended() {
        let call = Call::new(Endpoint::GetUsers).query("limit", 20).query("cursor", "abc=");
        assert_eq!(call.url(BASE).unwrap(), format!("{BASE}users?limit=20&cursor=abc%3D"));
    }

    #[test]
    fn request_headers_in_order() {
        let request = Call::new(Endpoint::DownloadThumbnail)
            .param("uuid", "u-1")
            .header("share-secret:s3cr3t")
            .into_request(BASE)
            .unwrap()
            .first_header("Authorization:Bearer T");
        assert_eq!(request.verb, Verb::Get);
        assert_eq!(
            request.headers,
            vec![
                "Authorization:Bearer T",
                "Accept:application/octet-stream",
                "thumbnail:true",
                "share-secret:s3cr3t",
            ]
        );
    }

    #[test]
    fn json_body_gets_content_type_once() {
        let request = Call::new(Endpoint::CreateUser)
            .json(&json!({"username": "u", "password": "p"}))
            .unwrap()
            .into_request(BASE)
            .unwrap();
        assert_eq!(request.headers.last().unwrap(), "Content-Type:application/json");

        let request = Call::new(Endpoint::AddGroupMembers)
            .param("group_id", "g")
            .json(&json!({"usernames": ["a"]}))
            .unwrap()
            .into_request(BASE)
            .unwrap();
        let content_types = request
            .headers
            .iter()
            .filter(|line| line.starts_with("Content-Type"))
            .count();
        assert_eq!(content_types, 1);
    }

    #[test]
    fn get_with_body_gets_no_content_type() {
        let request = Call::new(Endpoint::GetUser)
            .param("username", "u")
            .json(&json!({"ignored": true}))
            .unwrap()
            .into_request(BASE)
            .unwrap();
        assert!(request.headers.iter().all(|line| !line.starts_with("Content-Type")));
    }

    #[test]
    fn malformed_call_header_is_rejected() {
        let err = Call::new(Endpoint::GetUsers)
            .header("no-colon")
            .into_request(BASE)
            .unwrap_err();
        assert!(matches!(err, EasemobError::InvalidHeader(line) if line == "no-colon"));
    }
}
