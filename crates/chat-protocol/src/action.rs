//! Action-name vocabulary shared by requests and responses.

/// Logical action carried in an envelope's `name` field.
///
/// Requests use the first five; `ClientDisconnected` only ever appears
/// in unsolicited responses, and `Unknown` tags error responses for
/// unroutable or undecodable input.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    Login,
    Logout,
    SendMessage,
    GetUsers,
    GetUsersCount,
    ClientDisconnected,
    Unknown,
}

impl Action {
    /// Wire spelling of this action.
    pub fn as_name(self) -> &'static str {
        match self {
            Action::Login => "login",
            Action::Logout => "logout",
            Action::SendMessage => "send_message",
            Action::GetUsers => "get_users",
            Action::GetUsersCount => "get_users_count",
            Action::ClientDisconnected => "client_disconnected",
            Action::Unknown => "unknown",
        }
    }

    /// Parse a wire name into a request action.
    ///
    /// Returns `None` for anything a client may not request, including
    /// the response-only names.
    pub fn from_request_name(name: &str) -> Option<Self> {
        match name {
            "login" => Some(Action::Login),
            "logout" => Some(Action::Logout),
            "send_message" => Some(Action::SendMessage),
            "get_users" => Some(Action::GetUsers),
            "get_users_count" => Some(Action::GetUsersCount),
            _ => None,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_name())
    }
}
