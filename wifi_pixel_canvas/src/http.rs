//! HTTP server for the control panel.
//!
//! Handlers run on the ESP-IDF httpd task. They read the form body (the
//! first `MAX_BODY_LEN` bytes, the rest is drained), hand the
//! request to the main loop through a [`RequestSender`] and write back
//! whatever the main loop answers.

use embedded_svc::http::Headers;
use embedded_svc::io::{Read, Write};
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::http::Method as HttpMethod;
use log::*;
use pixel_canvas::{read_body, Method, Request, RequestSender, Response, Route, MAX_BODY_LEN};

/// Starts the server and registers every route of the control panel.
/// The returned handle must be kept alive.
pub fn start_server(port: u16, requests: RequestSender) -> anyhow::Result<EspHttpServer<'static>> {
    let config = Configuration {
        http_port: port,
        stack_size: 8192,
        ..Default::default()
    };

    let mut server = EspHttpServer::new(&config)?;

    for route in Route::ALL {
        let requests = requests.clone();
        let method = route.method();
        server.fn_handler(route.path(), http_method(method), move |mut req| -> anyhow::Result<()> {
            debug!("{} body of {:?} bytes", route.path(), req.content_len());
            let body = read_body(|buf| Ok(req.read(buf)?), MAX_BODY_LEN)?;

            let request = Request::new(method, req.uri(), &body);
            let response = match requests.submit(request) {
                Ok(response) => response,
                Err(e) => {
                    error!("{}", e);
                    req.into_status_response(500)?
                        .write_all(b"Internal Server Error")?;
                    return Ok(());
                }
            };

            match response {
                Response::Page { content_type, body } => {
                    req.into_response(200, Some("OK"), &[("Content-Type", content_type)])?
                        .write_all(body.as_bytes())?;
                }
                Response::Redirect { location } => {
                    req.into_response(
                        302,
                        Some("Found"),
                        &[("Location", location), ("Content-Type", "text/plain")],
                    )?;
                }
                Response::Status { status, message } => {
                    req.into_status_response(status)?
                        .write_all(message.as_bytes())?;
                }
            }
            Ok(())
        })?;
    }

    info!("HTTP server started on port {}", port);
    Ok(server)
}

fn http_method(method: Method) -> HttpMethod {
    match method {
        Method::Get => HttpMethod::Get,
        Method::Post => HttpMethod::Post,
    }
}
