use crate::config::Config;
use crate::http_client;
use crate::sync::SendBudget;
use frankenstein::AllowedUpdate;
use frankenstein::AnswerCallbackQueryParams;
use frankenstein::ErrorResponse;
use frankenstein::GetUpdatesParams;
use frankenstein::ParseMode;
use frankenstein::ReplyMarkup;
use frankenstein::SendMessageParams;
use frankenstein::TelegramApi;
use frankenstein::Update;
use isahc::prelude::*;
use isahc::HttpClient;
use isahc::Request;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use typed_builder::TypedBuilder;

#[derive(Clone, Debug)]
pub struct Api {
    pub api_url: String,
    pub update_params: GetUpdatesParams,
    pub buffer: VecDeque<Update>,
    pub http_client: HttpClient,
}

#[derive(Debug)]
pub enum Error {
    HttpError(HttpError),
    ApiError(ErrorResponse),
}

#[derive(Eq, PartialEq, Debug)]
pub struct HttpError {
    pub code: u16,
    pub message: String,
}

/// A message addressed to one delivery target. The thread id is omitted
/// from the API call entirely when absent (top-level chat delivery).
#[derive(TypedBuilder)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    #[builder(default, setter(into))]
    pub message_thread_id: Option<i32>,
    #[builder(default, setter(into))]
    pub reply_markup: Option<ReplyMarkup>,
}

impl Api {
    pub fn new(token: &str) -> Api {
        let base_url = Config::telegram_base_url();

        Self::with_api_url(format!("{base_url}{token}"))
    }

    pub fn with_api_url(api_url: String) -> Api {
        let http_client = http_client::client().clone();

        let update_params = GetUpdatesParams::builder()
            .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
            .build();

        Api {
            api_url,
            update_params,
            http_client,
            buffer: VecDeque::new(),
        }
    }

    pub fn next_update(&mut self) -> Option<Update> {
        if let Some(update) = self.buffer.pop_front() {
            return Some(update);
        }

        match self.get_updates(&self.update_params) {
            Ok(updates) => {
                for update in updates.result {
                    self.buffer.push_back(update);
                }

                if let Some(last_update) = self.buffer.back() {
                    self.update_params.offset = Some((last_update.update_id + 1).into());
                }

                self.buffer.pop_front()
            }

            Err(err) => {
                log::error!("Failed to fetch updates {:?}", err);
                None
            }
        }
    }

    /// Unbudgeted send used by the command surface.
    pub fn reply_with_text_message(&self, message: &OutgoingMessage) -> Result<(), Error> {
        let params = Self::build_send_params(message);

        match self.send_message(&params) {
            Ok(_) => Ok(()),
            Err(err) => {
                log::error!("Failed to send message to {}: {:?}", message.chat_id, err);
                Err(err)
            }
        }
    }

    /// Budgeted send used by the feed engine. Every attempt costs one
    /// budget unit; an exhausted budget short-circuits without a network
    /// call. A 429 response is retried exactly once after sleeping
    /// `retry_after + 1` seconds; the retry pays for its own attempt.
    pub fn deliver(&self, message: &OutgoingMessage, budget: &mut SendBudget) -> bool {
        let params = Self::build_send_params(message);
        let mut retried = false;

        loop {
            if !budget.try_consume() {
                return false;
            }

            let error = match self.send_message(&params) {
                Ok(_) => return true,
                Err(error) => error,
            };

            if !retried {
                if let Some(retry_after) = retry_after_seconds(&error) {
                    log::warn!(
                        "Telegram 429 for {} ({:?}), retrying in {}s",
                        message.chat_id,
                        message.message_thread_id,
                        retry_after
                    );
                    thread::sleep(Duration::from_secs(retry_after + 1));
                    retried = true;
                    continue;
                }
            }

            log::error!(
                "Failed to send message to {} ({:?}): {:?}",
                message.chat_id,
                message.message_thread_id,
                error
            );

            return false;
        }
    }

    pub fn answer_callback(&self, callback_query_id: &str, text: &str) {
        let params = AnswerCallbackQueryParams::builder()
            .callback_query_id(callback_query_id)
            .text(text)
            .build();

        if let Err(err) = self.answer_callback_query(&params) {
            log::error!("Failed to answer callback query {:?}", err);
        }
    }

    fn build_send_params(message: &OutgoingMessage) -> SendMessageParams {
        let mut params = SendMessageParams::builder()
            .chat_id(message.chat_id)
            .text(message.text.clone())
            .parse_mode(ParseMode::Html)
            .build();

        params.message_thread_id = message.message_thread_id;
        params.reply_markup = message.reply_markup.clone();

        params
    }
}

/// Backoff duration from a rate-limit error, when the server provided one.
fn retry_after_seconds(error: &Error) -> Option<u64> {
    match error {
        Error::ApiError(response) if response.error_code == 429 => response
            .parameters
            .as_ref()
            .and_then(|parameters| parameters.retry_after)
            .map(|seconds| seconds as u64)
            .filter(|seconds| *seconds > 0),
        _ => None,
    }
}

impl From<isahc::http::Error> for Error {
    fn from(error: isahc::http::Error) -> Self {
        let message = format!("{error:?}");

        let error = HttpError { code: 500, message };

        Error::HttpError(error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        let message = format!("{error:?}");

        let error = HttpError { code: 500, message };

        Error::HttpError(error)
    }
}

impl From<isahc::Error> for Error {
    fn from(error: isahc::Error) -> Self {
        let message = format!("{error:?}");

        let error = HttpError { code: 500, message };

        Error::HttpError(error)
    }
}

impl TelegramApi for Api {
    type Error = Error;

    fn request<T1: serde::ser::Serialize, T2: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: Option<T1>,
    ) -> Result<T2, Error> {
        let url = format!("{}/{method}", self.api_url);

        let request_builder = Request::post(url).header("Content-Type", "application/json");

        let mut response = match params {
            None => {
                let request = request_builder.body(())?;
                self.http_client.send(request)?
            }
            Some(data) => {
                let json = serde_json::to_string(&data).map_err(|error| {
                    Error::HttpError(HttpError {
                        code: 500,
                        message: format!("{error:?}"),
                    })
                })?;
                let request = request_builder.body(json)?;

                self.http_client.send(request)?
            }
        };

        let mut bytes = Vec::new();
        response.copy_to(&mut bytes)?;

        let parsed_result: Result<T2, serde_json::Error> = serde_json::from_slice(&bytes);

        match parsed_result {
            Ok(result) => Ok(result),
            Err(_) => {
                let parsed_error: Result<ErrorResponse, serde_json::Error> =
                    serde_json::from_slice(&bytes);

                match parsed_error {
                    Ok(result) => Err(Error::ApiError(result)),
                    Err(error) => {
                        let message = format!("{:?} {error:?}", std::str::from_utf8(&bytes));

                        let error = HttpError { code: 500, message };

                        Err(Error::HttpError(error))
                    }
                }
            }
        }
    }

    // isahc doesn't support multipart uploads, and this bot never sends
    // files anyway.
    fn request_with_form_data<T1: serde::ser::Serialize, T2: serde::de::DeserializeOwned>(
        &self,
        _method: &str,
        _params: T1,
        _files: Vec<(&str, PathBuf)>,
    ) -> Result<T2, Error> {
        let error = HttpError {
            code: 500,
            message: "isahc doesn't support form data requests".to_string(),
        };

        Err(Error::HttpError(error))
    }
}

#[cfg(test)]
mod tests {
    use super::{Api, OutgoingMessage};
    use crate::sync::SendBudget;
    use mockito::mock;

    fn api() -> Api {
        Api::with_api_url(format!("{}/bottest-token", mockito::server_url()))
    }

    fn message() -> OutgoingMessage {
        OutgoingMessage::builder()
            .chat_id(1)
            .text("hello".to_string())
            .build()
    }

    #[test]
    fn it_delivers_a_message_consuming_one_budget_unit() {
        let _m = mock("POST", "/bottest-token/sendMessage")
            .with_status(200)
            .with_body(
                r#"{"ok":true,"result":{"message_id":1,"date":0,"chat":{"id":1,"type":"private"}}}"#,
            )
            .create();

        let mut budget = SendBudget::new(5);

        assert!(api().deliver(&message(), &mut budget));
        assert_eq!(budget.remaining(), 4);
    }

    #[test]
    fn it_skips_the_network_call_when_the_budget_is_exhausted() {
        let m = mock("POST", "/bottest-token/sendMessage").expect(0).create();

        let mut budget = SendBudget::new(0);

        assert!(!api().deliver(&message(), &mut budget));
        assert_eq!(budget.remaining(), 0);
        m.assert();
    }

    #[test]
    fn it_fails_without_retry_on_plain_errors() {
        let _m = mock("POST", "/bottest-token/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request"}"#)
            .create();

        let mut budget = SendBudget::new(5);

        assert!(!api().deliver(&message(), &mut budget));
        assert_eq!(budget.remaining(), 4);
    }

    #[test]
    fn it_retries_a_rate_limit_once_consuming_two_budget_units() {
        let m = mock("POST", "/bottest-token/sendMessage")
            .with_status(429)
            .with_body(
                r#"{"ok":false,"error_code":429,"description":"Too Many Requests: retry after 1","parameters":{"retry_after":1}}"#,
            )
            .expect(2)
            .create();

        let mut budget = SendBudget::new(5);

        // Both attempts hit 429; the second is final.
        assert!(!api().deliver(&message(), &mut budget));
        assert_eq!(budget.remaining(), 3);
        m.assert();
    }
}
