//! Practice backend over HTTP.

mod wire;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use quiz_core::model::{FilterCriteria, Question};

use crate::auth::AuthToken;
use crate::config::ApiConfig;
use crate::error::{ConfigError, ServiceError};
use crate::sources::{
    AnswerSink, AnswerSubmission, MistakeRecord, QuestionSource, SubmissionReceipt, WordExplanation,
    WordLookup,
};

use wire::{EvaluatedAnswerDto, MistakeRecordDto, PracticeQuestionDto, SubmitAnswerDto};

/// Client for the practice, mistakes and vocabulary endpoints.
///
/// Every call takes the bearer token explicitly; a missing token fails with
/// `ServiceError::Authentication` before anything is sent.
#[derive(Clone)]
pub struct HttpPracticeApi {
    client: Client,
    base_url: Url,
}

impl HttpPracticeApi {
    /// # Errors
    ///
    /// Returns `ConfigError` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ask the backend to pre-generate questions for this user.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the request fails or is rejected.
    pub async fn initialize_cache(&self, token: &AuthToken) -> Result<(), ServiceError> {
        let bearer = token.require()?;
        let url = self.endpoint("practice/cache/initialize")?;
        debug!("initializing question cache");
        let response = self.client.post(url).bearer_auth(bearer).send().await?;
        check_status(response).await.map(drop)
    }

    /// Previously missed questions, converted for replay.
    ///
    /// Records that cannot form a valid question are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError` if the request fails or the body is not a list
    /// of mistake records.
    pub async fn fetch_mistakes(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<MistakeRecord>, ServiceError> {
        let bearer = token.require()?;
        let url = self.endpoint("mistakes/")?;
        let records: Vec<MistakeRecordDto> =
            self.send_json(self.client.get(url).bearer_auth(bearer)).await?;

        let total = records.len();
        let mistakes: Vec<MistakeRecord> = records
            .into_iter()
            .filter_map(|record| match record.into_record() {
                Ok(mistake) => Some(mistake),
                Err(err) => {
                    warn!("skipping mistake record: {err}");
                    None
                }
            })
            .collect();
        debug!("loaded {} of {total} mistake records", mistakes.len());
        Ok(mistakes)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceError::Validation(format!("bad endpoint {path}: {err}")))
    }

    fn word_endpoint(&self, word: &str) -> Result<Url, ServiceError> {
        let mut url = self.endpoint("vocab/word/")?;
        url.path_segments_mut()
            .map_err(|()| ServiceError::Validation("api url cannot carry a path".into()))?
            .pop_if_empty()
            .push(word)
            .push("explanation");
        Ok(url)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ServiceError> {
        let response = check_status(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = classify(status, wire::detail_from_body(&body));
    warn!("backend answered {status}: {err}");
    Err(err)
}

/// Map a non-2xx status onto the service error taxonomy.
pub(crate) fn classify(status: StatusCode, detail: Option<String>) -> ServiceError {
    let message = detail.unwrap_or_else(|| format!("request failed with status {status}"));
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ServiceError::Authentication(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ServiceError::Validation(message)
        }
        _ => ServiceError::Transient {
            status: Some(status),
            message,
        },
    }
}

#[async_trait]
impl QuestionSource for HttpPracticeApi {
    async fn fetch(
        &self,
        criteria: &FilterCriteria,
        token: &AuthToken,
    ) -> Result<Question, ServiceError> {
        let bearer = token.require()?;
        let mut url = self.endpoint("practice/set/new")?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(topic) = criteria.topic_filter() {
                query.append_pair("topic", topic.as_str());
            }
            query.append_pair("difficulty", criteria.difficulty.as_str());
        }
        debug!("fetching question: {url}");

        let dto: PracticeQuestionDto = self
            .send_json(self.client.get(url).bearer_auth(bearer))
            .await?;
        Ok(dto.into_question(criteria.topic_filter())?)
    }
}

#[async_trait]
impl AnswerSink for HttpPracticeApi {
    async fn submit(
        &self,
        submission: &AnswerSubmission,
        token: &AuthToken,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let bearer = token.require()?;
        let url = self.endpoint("practice/set/submit")?;
        let payload = [SubmitAnswerDto::from(submission)];
        debug!("submitting answers for {}", submission.question_id);

        let evaluated: Vec<EvaluatedAnswerDto> = self
            .send_json(self.client.post(url).bearer_auth(bearer).json(&payload))
            .await?;
        Ok(wire::receipt_from(evaluated))
    }
}

#[async_trait]
impl WordLookup for HttpPracticeApi {
    async fn explain(
        &self,
        word: &str,
        token: &AuthToken,
    ) -> Result<WordExplanation, ServiceError> {
        let bearer = token.require()?;
        let url = self.word_endpoint(word)?;
        self.send_json(self.client.get(url).bearer_auth(bearer))
            .await
    }
}
