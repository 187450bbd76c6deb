use std::env;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};

use crate::domain::{DecayTree, Params, ParticleId};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "graphphys=trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    // Per-statement grammar traces drown everything else
    let noisy_modules = ["graphphys::parser::grammar"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
            || *metadata.level() <= tracing::Level::DEBUG
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Write a GraphPhys document below `dir` and return its path.
pub fn write_document(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create {}: {e}", parent.display()));
    }
    std::fs::write(&path, content).unwrap_or_else(|e| panic!("write {}: {e}", path.display()));
    path
}

/// `p0 -> {p1}; p1 -> {p2}; ...` with `links` decays.
pub fn chain_document(links: usize) -> String {
    (0..links)
        .map(|i| format!("p{i} -> {{p{}}}", i + 1))
        .collect::<Vec<_>>()
        .join(";\n")
}

/// Add a single-product chain of `links` decays to `tree`; returns its root.
pub fn add_chain(tree: &mut DecayTree, links: usize) -> ParticleId {
    let root = tree.add_particle("p0", Params::new());
    let mut current = root;
    for i in 1..=links {
        let next = tree.add_particle(format!("p{i}"), Params::new());
        tree.add_decay(current, [next], Params::new())
            .unwrap_or_else(|e| panic!("link {i}: {e}"));
        current = next;
    }
    root
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn given_link_count_when_building_chains_then_depth_matches() {
        let mut tree = DecayTree::new();
        let root = add_chain(&mut tree, 5);

        assert_eq!(tree.depth(root).unwrap(), 5);
        assert_eq!(chain_document(2), "p0 -> {p1};\np1 -> {p2}");
    }
}
