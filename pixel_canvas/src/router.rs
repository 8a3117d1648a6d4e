// ===============================================================================
// REQUEST ROUTER
// ===============================================================================
// GET  /      -> control page
// POST /text  -> clear, print the `text` field at size 2, redirect to /
// POST /draw  -> clear, paint every checked cell in the selected color,
//                redirect to /
// ===============================================================================

use core::fmt::Debug;

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use log::*;

use crate::form::Form;
use crate::grid::{ColorSelection, GridCell, COLOR_FIELD};
use crate::page::control_page;
use crate::surface::{DisplaySurface, TextSize, DEFAULT_TEXT_COLOR};

/// Form field holding the line for `/text`.
pub const TEXT_FIELD: &str = "text";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One incoming HTTP request, reduced to what the handlers look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub form: Form,
}

impl Request {
    /// Builds a request from the raw URI and body. Query parameters and body
    /// fields are both visible to the handlers, body fields first.
    pub fn new(method: Method, uri: &str, body: &[u8]) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let mut form = Form::from_bytes(body);
        form.merge(Form::parse(query));
        Self {
            method,
            path: path.to_string(),
            form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// 200 with a body.
    Page {
        content_type: &'static str,
        body: &'static str,
    },
    /// 302 to `location` with an empty body.
    Redirect { location: &'static str },
    /// Anything else the router answers itself.
    Status { status: u16, message: &'static str },
}

impl Response {
    pub fn status(&self) -> u16 {
        match self {
            Response::Page { .. } => 200,
            Response::Redirect { .. } => 302,
            Response::Status { status, .. } => *status,
        }
    }

    fn back_to_index() -> Self {
        Response::Redirect { location: "/" }
    }
}

/// Everything the handlers mutate. There is exactly one per device.
pub struct DeviceContext<D> {
    pub surface: DisplaySurface<D>,
}

impl<D> DeviceContext<D>
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    pub fn new(surface: DisplaySurface<D>) -> Self {
        Self { surface }
    }
}

/// The static route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Index,
    Text,
    Draw,
}

impl Route {
    pub const ALL: [Route; 3] = [Route::Index, Route::Text, Route::Draw];

    pub fn path(self) -> &'static str {
        match self {
            Route::Index => "/",
            Route::Text => "/text",
            Route::Draw => "/draw",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Route::Index => Method::Get,
            Route::Text | Route::Draw => Method::Post,
        }
    }

    pub fn handle<D>(self, ctx: &mut DeviceContext<D>, form: &Form) -> Response
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
    {
        match self {
            Route::Index => index(),
            Route::Text => show_text(ctx, form),
            Route::Draw => draw(ctx, form),
        }
    }
}

/// Runs the handler registered for the request, or answers 404/405.
pub fn dispatch<D>(ctx: &mut DeviceContext<D>, request: &Request) -> Response
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    info!("{:?} {}", request.method, request.path);

    let mut path_known = false;
    for route in Route::ALL {
        if route.path() != request.path {
            continue;
        }
        if route.method() == request.method {
            return route.handle(ctx, &request.form);
        }
        path_known = true;
    }

    if path_known {
        warn!("{:?} not allowed on {}", request.method, request.path);
        Response::Status {
            status: 405,
            message: "Method Not Allowed",
        }
    } else {
        warn!("No route for {}", request.path);
        Response::Status {
            status: 404,
            message: "Not Found",
        }
    }
}

fn index() -> Response {
    Response::Page {
        content_type: "text/html",
        body: control_page(),
    }
}

fn show_text<D>(ctx: &mut DeviceContext<D>, form: &Form) -> Response
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    let text = form.get(TEXT_FIELD).unwrap_or_default();
    info!("Showing text: {:?}", text);

    ctx.surface.clear();
    ctx.surface.print_line(text, TextSize::Large, DEFAULT_TEXT_COLOR);

    Response::back_to_index()
}

fn draw<D>(ctx: &mut DeviceContext<D>, form: &Form) -> Response
where
    D: DrawTarget<Color = Rgb565>,
    D::Error: Debug,
{
    let color = ColorSelection::from_field(form.get(COLOR_FIELD));

    ctx.surface.clear();
    let mut painted = 0;
    for cell in GridCell::all() {
        if form.contains(&cell.field_name()) {
            ctx.surface.paint_cell(cell, color.rgb565());
            painted += 1;
        }
    }
    info!("Painted {} cells in {:?}", painted, color);

    Response::back_to_index()
}
