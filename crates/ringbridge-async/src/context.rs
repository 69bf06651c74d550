use std::collections::BTreeMap;

use crate::request::Request;
use crate::response::Response;

/// Named string parameters (query or route).
pub type Params = BTreeMap<String, String>;

/// The host's pairing of one request with the response being built for it.
///
/// Route parameters are whatever the host's router captured while matching
/// the request path; they are empty when the host does no routing.
#[derive(Debug)]
pub struct Context {
    request: Request,
    response: Response,
    route_params: Params,
}

impl Context {
    pub fn new(request: Request) -> Self {
        Self {
            request,
            response: Response::new(),
            route_params: Params::new(),
        }
    }

    pub fn with_route_params(mut self, route_params: Params) -> Self {
        self.route_params = route_params;
        self
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn route_params(&self) -> &Params {
        &self.route_params
    }

    pub fn into_response(self) -> Response {
        self.response
    }

    pub fn into_parts(self) -> (Request, Response, Params) {
        (self.request, self.response, self.route_params)
    }
}
