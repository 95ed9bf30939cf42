use anyhow::Result;
use glow::{Channel, Error, Graph, GraphConfig, NodeKinds};
use std::fs;

const PIPELINE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../glow-config/config-examples/pipeline.json5"
);

struct Globals {
    count: i32,
}

fn kinds(collected: &Channel<i32>) -> Result<NodeKinds<Globals>> {
    let mut kinds = NodeKinds::new();

    kinds.register("counter", || {
        |globals: &Globals, output: Channel<i32>| {
            for value in 1..=globals.count {
                output.send(value)?;
            }
            anyhow::Ok(())
        }
    })?;

    kinds.register("doubler", || {
        |globals: &Globals, input: Channel<i32>, output: Channel<i32>| {
            for _ in 0..globals.count {
                output.send(input.recv()? * 2)?;
            }
            anyhow::Ok(())
        }
    })?;

    let collected = collected.clone();
    kinds.register("collector", move || {
        let collected = collected.clone();
        move |globals: &Globals, input: Channel<i32>| {
            for _ in 0..globals.count {
                collected.send(input.recv()?)?;
            }
            anyhow::Ok(())
        }
    })?;

    Ok(kinds)
}

#[test]
fn run_pipeline_from_config_file() -> Result<()> {
    let collected = Channel::bounded(8);
    let config = GraphConfig::open(PIPELINE)?;
    let graph = Graph::from_config(Globals { count: 4 }, &config, &kinds(&collected)?)?;

    assert_eq!(graph.foreground(), Some("Sink"));
    assert_eq!(graph.connections().len(), 2);
    assert_eq!(graph.connections()[1].capacity, 0);

    let launched = graph.launch()?;
    assert_eq!(launched.foreground(), Some("Sink"));
    assert_eq!(collected.drain().collect::<Vec<_>>(), [2, 4, 6, 8]);
    assert!(launched.join().values().all(Result::is_ok));
    Ok(())
}

#[test]
fn save_pipeline_diagram() -> Result<()> {
    let collected = Channel::bounded(1);
    let config = GraphConfig::open(PIPELINE)?;
    let graph = Graph::from_config(Globals { count: 1 }, &config, &kinds(&collected)?)?;

    let path = std::env::temp_dir().join("glow-pipeline.dot");
    graph.save_dot_file(&path)?;
    let text = fs::read_to_string(&path)?;
    fs::remove_file(&path)?;

    // vertices are numbered in declaration order: Source, Double, Sink
    assert!(text.contains("node_0 -> chan_0"));
    assert!(text.contains("chan_0 -> node_1"));
    assert!(text.contains("node_1 -> chan_1"));
    assert!(text.contains("chan_1 -> node_2"));
    assert!(text.contains("Double|<In>In|<Out>Out"));
    Ok(())
}

#[test]
fn unknown_kind_is_rejected() -> Result<()> {
    let config: GraphConfig = json5::from_str(
        r#"{
            version: "0.1.0",
            nodes: {
                Mystery: { kind: "mystery", ports: [] },
            },
        }"#,
    )?;

    let collected = Channel::bounded(1);
    let err = Graph::from_config(Globals { count: 0 }, &config, &kinds(&collected)?).unwrap_err();
    assert!(matches!(err, Error::UnknownNodeKind { ref kind } if kind == "mystery"));
    Ok(())
}

#[test]
fn invalid_config_is_rejected() -> Result<()> {
    let config: GraphConfig = json5::from_str(
        r#"{
            version: "0.1.0",
            nodes: {
                Source: { kind: "counter", ports: ["Out"] },
            },
            connections: [
                { capacity: 1, endpoints: ["Source:Out", "Nowhere:In"] },
            ],
        }"#,
    )?;

    let collected = Channel::bounded(1);
    let err = Graph::from_config(Globals { count: 0 }, &config, &kinds(&collected)?).unwrap_err();
    assert!(matches!(err, Error::Other(_)));
    Ok(())
}
