use agenda_engine::account::{Credentials, NewUser, User};
use reqwest::Method;
use serde::Deserialize;
use tracing::info;

use super::{decode, ApiClient};
use crate::error::Result;
use crate::session::KeyValueStore;

#[derive(Debug, Deserialize)]
struct AccessToken {
    access_token: String,
}

impl<S: KeyValueStore> ApiClient<S> {
    /// Exchange credentials for a token, then load the user behind it.
    ///
    /// The session is issued only when both calls succeed; any failure leaves it cleared.
    pub async fn login(&self, credentials: &Credentials) -> Result<User> {
        let result = self.authenticate(credentials).await;
        if result.is_err() {
            self.session().invalidate();
        }
        result
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<User> {
        let form = [
            ("username", credentials.email.as_str()),
            ("password", credentials.password.as_str()),
        ];
        let builder = self.request(Method::POST, "auth/access-token")?.form(&form);
        let token: AccessToken = decode(self.send_with(builder, None).await?).await?;

        let builder = self.request(Method::GET, "users/me")?;
        let user: User = decode(self.send_with(builder, Some(&token.access_token)).await?).await?;

        self.session().issue(token.access_token, user.clone())?;
        info!(user = %user.email, "signed in");
        Ok(user)
    }

    pub async fn register(&self, new_user: &NewUser) -> Result<User> {
        self.send_json(Method::POST, "auth/register", new_user).await
    }

    pub async fn current_user(&self) -> Result<User> {
        let token = self.require_token()?;
        let builder = self.request(Method::GET, "users/me")?;
        decode(self.send_with(builder, Some(&token)).await?).await
    }

    /// Forget the session locally; the backend keeps no server-side session.
    pub fn logout(&self) {
        self.session().invalidate();
    }
}
