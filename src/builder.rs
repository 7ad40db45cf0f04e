use crate::descriptor::{Body, CallData, CallOverride, EndpointDescriptor, RequestDescriptor};
use crate::encode::{is_form_urlencoded, to_query_string};
use crate::error::Result;
use crate::headers::{self, Headers};
use crate::multipart::{build_multipart, FieldValue, MultipartData};
use crate::template::{resolve, ParamPolicy};
use serde_json::{Map, Value};

/// Build the request for one call.
///
/// Headers merge as base, then descriptor, then `add_headers`. Fields named in
/// `descriptor.params` fill the URL and are left out of the payload; the rest
/// goes into the body for PUT/POST/PATCH and into the query otherwise. The
/// descriptor's options and then the override's options are overlaid last.
pub fn build_request(
    descriptor: &EndpointDescriptor,
    base_headers: &Headers,
    data: &CallData,
    call: &CallOverride,
    policy: ParamPolicy,
) -> Result<RequestDescriptor> {
    let url = resolve(&descriptor.endpoint, &descriptor.params, &data.fields, policy)?;
    let headers = headers::merge([base_headers, &descriptor.headers, &call.add_headers]);
    let payload = without_params(&data.fields, &descriptor.params);

    let mut request = if descriptor.method.is_form_data() {
        let mut multipart = MultipartData::new();
        multipart.files = data.files.clone();
        for (name, value) in payload {
            multipart.fields.insert(name, FieldValue::from(value));
        }
        for (name, value) in &data.form_fields {
            multipart.fields.insert(name.clone(), value.clone());
        }
        build_multipart(multipart, &headers, &url)
    } else {
        if !data.files.is_empty() {
            tracing::warn!(
                endpoint = %descriptor.endpoint,
                files = data.files.len(),
                "ignoring files passed to a non-multipart endpoint"
            );
        }

        let mut payload = payload;
        for (name, value) in &data.form_fields {
            payload.insert(name.clone(), value.to_json());
        }

        let mut request = RequestDescriptor::new(descriptor.method, url);
        request.headers = headers;
        if descriptor.method.places_body() {
            request.data = Some(Body::Json(Value::Object(payload)));
        } else {
            request.params = Some(payload);
        }
        request
    };

    descriptor.options.apply_to(&mut request);
    call.options.apply_to(&mut request);

    encode_form_body(&mut request)?;

    tracing::trace!(method = %request.method, url = %request.url, "built request");
    Ok(request)
}

/// Replace a JSON body with its form-urlencoded string when the Content-Type asks for it
pub fn encode_form_body(request: &mut RequestDescriptor) -> Result<()> {
    let wants_form = headers::get(&request.headers, "Content-Type")
        .map(is_form_urlencoded)
        .unwrap_or(false);

    if wants_form {
        if let Some(Body::Json(ref value)) = request.data {
            request.data = Some(Body::Form(to_query_string(value)?));
        }
    }
    Ok(())
}

fn without_params(fields: &Map<String, Value>, params: &[String]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|(k, _)| !params.contains(k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
