use crate::descriptor::RequestDescriptor;
use crate::error::RestError;
use crate::response::RawResponse;

/// Runs before a request is sent and may rewrite it. Closures with the
/// matching signature implement this and the other hook traits.
pub trait RequestHook: Send + Sync {
    fn before_fetch(&self, request: RequestDescriptor) -> anyhow::Result<RequestDescriptor>;
}

/// Runs on every successful response
pub trait ResponseHook: Send + Sync {
    fn after_fetch(&self, response: RawResponse) -> anyhow::Result<RawResponse>;
}

/// Runs on every failed request. Returning `Ok` recovers the call with that
/// response; returning `Err` rejects the call with that error.
pub trait ErrorHook: Send + Sync {
    fn on_request_error(&self, error: RestError) -> Result<RawResponse, RestError>;
}

impl<F> RequestHook for F
where
    F: Fn(RequestDescriptor) -> anyhow::Result<RequestDescriptor> + Send + Sync,
{
    fn before_fetch(&self, request: RequestDescriptor) -> anyhow::Result<RequestDescriptor> {
        self(request)
    }
}

impl<F> ResponseHook for F
where
    F: Fn(RawResponse) -> anyhow::Result<RawResponse> + Send + Sync,
{
    fn after_fetch(&self, response: RawResponse) -> anyhow::Result<RawResponse> {
        self(response)
    }
}

impl<F> ErrorHook for F
where
    F: Fn(RestError) -> Result<RawResponse, RestError> + Send + Sync,
{
    fn on_request_error(&self, error: RestError) -> Result<RawResponse, RestError> {
        self(error)
    }
}
