//! coursecal calendar feed server - integration test support.
//!
//! This crate re-exports the workspace crates so integration tests can use
//! `coursecal_test::` paths.

#![allow(ambiguous_glob_reexports)]

pub mod component {
    pub use coursecal_core::*;
    pub use coursecal_service::*;

    pub mod db {
        pub use coursecal_db::db::*;

        pub mod connection {
            pub use coursecal_app::db_handler::DbProviderHandler;
            pub use coursecal_db::db::connection::*;
        }
    }

    pub mod model {
        pub use coursecal_db::model::*;
    }

    pub mod middleware {
        pub use coursecal_app::middleware::*;
    }

    pub mod config {
        pub use coursecal_app::config::ConfigHandler;
        pub use coursecal_core::config::*;
    }
}

pub mod app {
    pub use coursecal_app::*;

    pub mod api {
        pub use coursecal_app::app::api::*;
    }
}

pub use coursecal_rfc as rfc;
