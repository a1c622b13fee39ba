//! Google OAuth2 token exchanges
//!
//! Implements the authorization code flow for installed apps: a loopback
//! HTTP listener receives the redirect, the code is exchanged at the token
//! endpoint. Refresh uses the `refresh_token` grant.
//! Uses synchronous HTTP (ureq).

use chrono::{TimeDelta, Utc};
use log::{debug, info, warn};
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::time::Duration;

use super::api::TokenResponse;
use crate::auth::{Credential, OAuthProvider};
use crate::config::ClientSecret;
use crate::error::AuthError;

/// How long a loopback connection may stay silent before it is dropped
const REDIRECT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// OAuth provider talking to Google's endpoints
#[derive(Debug, Clone)]
pub struct GoogleOAuth {
    open_browser: bool,
}

impl Default for GoogleOAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl GoogleOAuth {
    /// Provider that opens the consent URL in the default browser
    pub fn new() -> Self {
        Self { open_browser: true }
    }

    /// Only print the consent URL
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    /// Bind the loopback listener on a port chosen by the OS
    fn start_local_server(&self) -> Result<(TcpListener, u16), AuthError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .map_err(|e| AuthError::ConsentFailed(format!("cannot bind loopback listener: {e}")))?;
        let port = listener
            .local_addr()
            .map_err(|e| AuthError::ConsentFailed(e.to_string()))?
            .port();
        Ok((listener, port))
    }

    fn authorization_url(secret: &ClientSecret, redirect_uri: &str, scope: &str) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            secret.auth_uri(),
            urlencoding::encode(&secret.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(scope),
        )
    }

    fn exchange_code(
        &self,
        secret: &ClientSecret,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenResponse, AuthError> {
        let mut response = ureq::post(secret.token_uri())
            .send_form([
                ("client_id", secret.client_id.as_str()),
                ("client_secret", secret.client_secret.as_str()),
                ("code", code),
                ("grant_type", "authorization_code"),
                ("redirect_uri", redirect_uri),
            ])
            .map_err(|e| AuthError::ConsentFailed(format!("code exchange failed: {e}")))?;

        response
            .body_mut()
            .read_json()
            .map_err(|e| AuthError::ConsentFailed(format!("malformed token response: {e}")))
    }
}

impl OAuthProvider for GoogleOAuth {
    fn refresh(&self, credential: &Credential) -> Result<Credential, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| AuthError::RefreshRejected("no refresh token".to_string()))?;
        let client = credential.client();

        let mut response = ureq::post(client.token_uri())
            .send_form([
                ("client_id", client.client_id.as_str()),
                ("client_secret", client.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .map_err(refresh_error)?;

        let token: TokenResponse = response.body_mut().read_json().map_err(refresh_error)?;

        Ok(credential_from_token(
            token,
            &client,
            &credential.scope,
            credential.refresh_token.clone(),
        ))
    }

    fn consent(&self, secret: &ClientSecret, scope: &str) -> Result<Credential, AuthError> {
        let (listener, port) = self.start_local_server()?;
        let redirect_uri = format!("http://127.0.0.1:{}", port);
        let auth_url = Self::authorization_url(secret, &redirect_uri, scope);

        println!("\n=== Gmail Authentication Required ===");
        println!("Visit this URL to authorize read-only access:\n{}", auth_url);

        if self.open_browser
            && let Err(e) = open::that(&auth_url)
        {
            warn!("Failed to open browser: {}. Please open the URL manually.", e);
        }

        println!("Waiting for authorization...");
        let code = wait_for_callback(&listener, REDIRECT_READ_TIMEOUT)?;

        info!("Exchanging authorization code for tokens");
        let token = self.exchange_code(secret, &code, &redirect_uri)?;
        println!("Authentication successful!\n");

        Ok(credential_from_token(token, secret, scope, None))
    }
}

/// Only an answer from the token endpoint counts as a rejection
fn refresh_error(err: ureq::Error) -> AuthError {
    match err {
        ureq::Error::StatusCode(status) => {
            AuthError::RefreshRejected(format!("token endpoint returned HTTP {status}"))
        }
        ureq::Error::Json(e) => AuthError::RefreshRejected(format!("malformed token response: {e}")),
        other => AuthError::Unreachable(other.to_string()),
    }
}

/// Build a credential from a token response.
///
/// `previous_refresh` is kept when the response carries no refresh token.
fn credential_from_token(
    token: TokenResponse,
    client: &ClientSecret,
    requested_scope: &str,
    previous_refresh: Option<String>,
) -> Credential {
    Credential {
        access_token: token.access_token,
        refresh_token: token.refresh_token.or(previous_refresh),
        expiry: token
            .expires_in
            .map(|secs| Utc::now() + TimeDelta::seconds(secs)),
        scope: token.scope.unwrap_or_else(|| requested_scope.to_string()),
        client_id: client.client_id.clone(),
        client_secret: client.client_secret.clone(),
        token_uri: client.token_uri.clone(),
    }
}

/// Wait for the redirect and extract the authorization code.
///
/// Browsers may open idle preconnects or ask for `/favicon.ico` first; such
/// connections are answered or dropped and the listener keeps waiting.
fn wait_for_callback(listener: &TcpListener, read_timeout: Duration) -> Result<String, AuthError> {
    loop {
        let (stream, _) = listener
            .accept()
            .map_err(|e| AuthError::ConsentFailed(format!("failed to accept redirect: {e}")))?;

        let Some(request_line) = read_request_line(&stream, read_timeout) else {
            debug!("Dropping loopback connection without a request");
            continue;
        };

        match parse_callback(&request_line) {
            Some(outcome) => {
                let (status, body) = match &outcome {
                    Ok(_) => ("200 OK", "Authentication successful! You can close this window."),
                    Err(_) => ("400 Bad Request", "Authentication failed. Please try again."),
                };
                respond(stream, status, body);
                return outcome;
            }
            None => {
                debug!("Ignoring loopback request: {}", request_line.trim_end());
                respond(stream, "404 Not Found", "Not found");
            }
        }
    }
}

/// First line of the request, or `None` on timeout, EOF or a blank line.
///
/// The header block is consumed so the reply is not cut short by a reset.
fn read_request_line(stream: &TcpStream, read_timeout: Duration) -> Option<String> {
    stream.set_read_timeout(Some(read_timeout)).ok()?;
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    match reader.read_line(&mut request_line) {
        Ok(n) if n > 0 && !request_line.trim().is_empty() => {}
        Ok(_) => return None,
        Err(e) => {
            debug!("Loopback read failed: {}", e);
            return None;
        }
    }

    let mut header = String::new();
    while matches!(reader.read_line(&mut header), Ok(n) if n > 0) && !header.trim().is_empty() {
        header.clear();
    }
    Some(request_line)
}

fn respond(mut stream: TcpStream, status: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n<html><body><h1>{}</h1></body></html>",
        status, body
    );
    if let Err(e) = stream.write_all(response.as_bytes()) {
        warn!("Failed to answer OAuth redirect: {}", e);
    }
}

/// Extract the authorization code from a redirect request line.
///
/// Format: `GET /?code=AUTH_CODE&scope=... HTTP/1.1`. Returns `None` when
/// the request carries neither `code` nor `error`.
fn parse_callback(request_line: &str) -> Option<Result<String, AuthError>> {
    let query = request_line
        .split_whitespace()
        .nth(1)
        .and_then(|path| path.split_once('?'))
        .map(|(_, query)| query)
        .unwrap_or("");

    let param = |name: &str| {
        query.split('&').find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            if key == name {
                urlencoding::decode(value).ok().map(|v| v.into_owned())
            } else {
                None
            }
        })
    };

    if let Some(error) = param("error") {
        return Some(Err(AuthError::ConsentFailed(format!(
            "authorization denied: {error}"
        ))));
    }

    let code = param("code")?;
    Some(if code.is_empty() {
        Err(AuthError::ConsentFailed(
            "no authorization code received".to_string(),
        ))
    } else {
        Ok(code)
    })
}
