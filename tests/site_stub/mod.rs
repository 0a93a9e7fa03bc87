use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Serves fixed documents over HTTP; unknown paths answer 404.
pub struct SiteStub {
    pub base_url: String,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[derive(Debug, Clone, Default)]
pub struct Routes {
    routes: HashMap<String, (&'static str, Vec<u8>)>,
}

impl Routes {
    pub fn html(mut self, path: &str, body: &str) -> Self {
        self.routes.insert(
            path.to_owned(),
            ("text/html; charset=utf-8", body.as_bytes().to_vec()),
        );
        self
    }

    #[allow(dead_code)]
    pub fn bytes(mut self, path: &str, content_type: &'static str, body: &[u8]) -> Self {
        self.routes
            .insert(path.to_owned(), (content_type, body.to_vec()));
        self
    }
}

impl SiteStub {
    pub fn spawn(routes: Routes) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start site stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let path = url.split(['?', '#']).next().unwrap_or(&url).to_owned();

                let Some((content_type, body)) = routes.routes.get(&path) else {
                    let _ = request.respond(
                        tiny_http::Response::from_string("not found").with_status_code(404),
                    );
                    continue;
                };

                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                        .expect("build header");
                let response = tiny_http::Response::from_data(body.clone())
                    .with_status_code(200)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }
}

impl Drop for SiteStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[allow(dead_code)]
pub fn page(title: &str, links: &[&str]) -> String {
    let anchors = links
        .iter()
        .map(|href| format!(r#"<li><a href="{href}">{href}</a></li>"#))
        .collect::<String>();
    format!(
        "<!doctype html>\n<html>\n  <head><title>{title}</title></head>\n  <body>\n    <h1>{title}</h1>\n    <ul>{anchors}</ul>\n  </body>\n</html>\n"
    )
}
