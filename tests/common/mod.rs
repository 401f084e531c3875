#![allow(dead_code)]

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use configurator::routes::{
    AuthController, BuildController, Controllers, UserController, WidgetController,
};
use configurator::{ControllerError, Request, ResponseSink, UniqueViolation};
use serde_json::json;
use tracing_subscriber::fmt::MakeWriter;

/// What every controller method of a [`Scripted`] does.
#[derive(Clone, Copy, Debug)]
pub enum Behavior {
    /// Answers with the matched path and its parameters.
    Respond,
    /// Succeeds without writing anything.
    Silent,
    /// Fails with a uniqueness violation.
    Conflict,
    /// Fails with an internal error.
    Fail,
}

pub struct Scripted(pub Behavior);

pub fn violation() -> UniqueViolation {
    UniqueViolation::new("Validation error").field("pseudo", "neo")
}

impl Scripted {
    async fn run(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        match self.0 {
            Behavior::Respond => res.json(&json!({
                "method": req.method().as_str(),
                "path": req.path(),
                "id": req.param("id"),
                "bid": req.param("bid"),
                "wid": req.param("wid"),
            })),
            Behavior::Silent => Ok(()),
            Behavior::Conflict => Err(violation().into()),
            Behavior::Fail => Err(anyhow::anyhow!("connection reset by database").into()),
        }
    }
}

macro_rules! scripted {
    ($trait:ident: $($method:ident),+) => {
        #[async_trait]
        impl $trait for Scripted {
            $(
                async fn $method(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
                    self.run(req, res).await
                }
            )+
        }
    };
}

scripted!(AuthController: login, signup, logout, refresh_token);
scripted!(UserController: get_user, modify_biography, modify_user, confirm_deletion, delete_user);
scripted!(BuildController: builds_of_user, create_build, modify_build, delete_build);
scripted!(WidgetController: widgets_of_build, create_widget, modify_widget, delete_widget);

pub fn controllers(behavior: Behavior) -> Controllers {
    Controllers::from_shared(Arc::new(Scripted(behavior)))
}

/// Log output collected in memory.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    pub fn lines_containing(&self, needle: &str) -> usize {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes).lines().filter(|l| l.contains(needle)).count()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
