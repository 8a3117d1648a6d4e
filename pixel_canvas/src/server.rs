//! Hand-off between the HTTP server task and the main loop.
//!
//! The HTTP server runs handlers on its own task. Handlers only parse the
//! request and pass it to the main loop, which owns the [`DeviceContext`] and
//! serves one request per [`RequestQueue::poll`]. The display is therefore
//! only ever touched from one thread and needs no lock.

use core::fmt::Debug;
use std::sync::mpsc::{self, Receiver, SyncSender};

use embedded_graphics::{pixelcolor::Rgb565, prelude::*};
use log::*;

use crate::router::{dispatch, DeviceContext, Request, Response};

struct Job {
    request: Request,
    reply: SyncSender<Response>,
}

/// Creates a connected sender/queue pair.
pub fn channel() -> (RequestSender, RequestQueue) {
    // Rendezvous: a handler blocks until the main loop has taken its request.
    let (jobs, queue) = mpsc::sync_channel(0);
    (RequestSender { jobs }, RequestQueue { jobs: queue })
}

/// Handle used by HTTP handlers. Cheap to clone, one per registered route.
#[derive(Clone)]
pub struct RequestSender {
    jobs: SyncSender<Job>,
}

impl RequestSender {
    /// Hands `request` to the main loop and blocks until it is answered.
    pub fn submit(&self, request: Request) -> anyhow::Result<Response> {
        let (reply, response) = mpsc::sync_channel(1);
        self.jobs
            .send(Job { request, reply })
            .map_err(|_| anyhow::anyhow!("Main loop is not accepting requests"))?;
        response
            .recv()
            .map_err(|_| anyhow::anyhow!("Main loop dropped the request"))
    }
}

/// Receiving end, owned by the main loop.
pub struct RequestQueue {
    jobs: Receiver<Job>,
}

impl RequestQueue {
    /// Waits for the next request, dispatches it and sends the response back.
    /// Fails once every [`RequestSender`] is gone.
    pub fn poll<D>(&self, ctx: &mut DeviceContext<D>) -> anyhow::Result<()>
    where
        D: DrawTarget<Color = Rgb565>,
        D::Error: Debug,
    {
        let job = self
            .jobs
            .recv()
            .map_err(|_| anyhow::anyhow!("HTTP server stopped"))?;
        let response = dispatch(ctx, &job.request);
        if job.reply.send(response).is_err() {
            warn!("Client handler went away before the response was ready");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Method;
    use crate::surface::{DisplaySurface, BACKGROUND};
    use crate::test_support::{canvas, count, PANEL_PIXELS};
    use std::thread;

    #[test]
    fn test_requests_are_served_in_order() {
        let (sender, queue) = channel();

        let client = thread::spawn(move || {
            let first = sender
                .submit(Request::new(Method::Post, "/draw", b"0-0=on&textColor=0"))
                .unwrap();
            let second = sender
                .submit(Request::new(Method::Post, "/draw", b"1-0=on&2-0=on"))
                .unwrap();
            let page = sender.submit(Request::new(Method::Get, "/", b"")).unwrap();
            (first, second, page)
        });

        let mut data = [BACKGROUND; PANEL_PIXELS];
        let mut ctx = DeviceContext::new(DisplaySurface::new(canvas(&mut data)));
        for _ in 0..3 {
            queue.poll(&mut ctx).unwrap();
        }

        let (first, second, page) = client.join().unwrap();
        assert_eq!(first.status(), 302);
        assert_eq!(second.status(), 302);
        assert_eq!(page.status(), 200);

        let fb = ctx.surface.into_inner();
        assert_eq!(count(&fb, Rgb565::RED), 0);
        assert_eq!(count(&fb, Rgb565::WHITE), 2 * 64);

        // All senders are gone now.
        let mut data = [BACKGROUND; PANEL_PIXELS];
        let mut ctx = DeviceContext::new(DisplaySurface::new(canvas(&mut data)));
        assert!(queue.poll(&mut ctx).is_err());
    }

    #[test]
    fn test_submit_fails_without_main_loop() {
        let (sender, queue) = channel();
        drop(queue);
        assert!(sender
            .submit(Request::new(Method::Get, "/", b""))
            .is_err());
    }
}
