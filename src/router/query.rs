//! Read-only topology queries against the current graph.

use std::collections::HashSet;

use super::Router;
use crate::graph::{DeviceId, NodeId, Selector};
use crate::RouterError;

impl Router {
    /// The input on a sink that would be used to show `source`.
    ///
    /// With `on` omitted, `source` must be an input node: every edge into it
    /// has to belong to the same device, and that device's input is
    /// returned. With `on` given, the input used at `on` on the way from
    /// `source` is returned.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NoOutputs`] if `source` feeds nothing
    /// - [`RouterError::AmbiguousSource`] if `source` feeds several devices
    ///   and `on` was not given
    /// - [`RouterError::NoRoute`] if `on` cannot be reached from `source`
    pub fn input_for(&self, source: &str, on: Option<&str>) -> Result<Selector, RouterError> {
        let generation = self.current();

        let edge = match on {
            None => {
                let edges = generation.graph.incoming_edges(source);
                let devices: HashSet<&DeviceId> = edges.iter().map(|edge| &edge.device).collect();
                if devices.len() > 1 {
                    return Err(RouterError::AmbiguousSource {
                        node: source.to_string(),
                    });
                }
                edges.last().map(|edge| (*edge).clone())
            }
            Some(sink) => generation.route(source, sink)?.edges.pop(),
        };

        edge.map(|edge| edge.input).ok_or_else(|| RouterError::NoOutputs {
            node: source.to_string(),
        })
    }

    /// The device an input node is attached to.
    ///
    /// # Errors
    ///
    /// - [`RouterError::NoOutputs`] if `source` feeds nothing
    /// - [`RouterError::NotAnInputNode`] if `source` has more than one
    ///   incoming edge
    pub fn device_for(&self, source: &str) -> Result<DeviceId, RouterError> {
        let generation = self.current();
        match generation.graph.incoming_edges(source).as_slice() {
            [] => Err(RouterError::NoOutputs {
                node: source.to_string(),
            }),
            [edge] => Ok(edge.device.clone()),
            _ => Err(RouterError::NotAnInputNode {
                node: source.to_string(),
            }),
        }
    }

    /// Devices a signal passes through from `source` to `sink`, nearest the
    /// source first.
    pub fn devices_between(&self, source: &str, sink: &str) -> Result<Vec<DeviceId>, RouterError> {
        let route = self.current().route(source, sink)?;
        Ok(route.edges.into_iter().map(|edge| edge.device).collect())
    }

    /// The linear chain of nodes immediately upstream of `sink`.
    ///
    /// Walks away from `sink` for as long as each node has exactly one
    /// upstream neighbour, collecting the nodes passed. This finds equipment
    /// installed for one output only (decoders, scalers). If `sink` has
    /// several inputs and `on_input` is not given, the chain is empty.
    ///
    /// # Errors
    ///
    /// - [`RouterError::UnknownNode`] if `sink` is not in the graph
    /// - [`RouterError::UnknownInput`] if `sink` has no input `on_input`
    pub fn upstream_devices_of(
        &self,
        sink: &str,
        on_input: Option<&Selector>,
    ) -> Result<Vec<NodeId>, RouterError> {
        let generation = self.current();
        let graph = &generation.graph;

        let node = graph.get(sink).ok_or_else(|| RouterError::UnknownNode {
            id: sink.to_string(),
        })?;

        let mut chain = Vec::new();
        if on_input.is_none() && graph.outdegree(sink) != 1 {
            return Ok(chain);
        }

        let initial = node
            .edges()
            .find(|edge| on_input.map_or(true, |input| edge.input == *input));
        let Some(initial) = initial else {
            return match on_input {
                Some(input) => Err(RouterError::UnknownInput {
                    sink: sink.to_string(),
                    input: input.to_string(),
                }),
                None => Ok(chain),
            };
        };

        let mut visited: HashSet<NodeId> = HashSet::from([node.id().clone()]);
        let mut successors = vec![initial.target.clone()];
        while let [next] = successors.as_slice() {
            let next = next.clone();
            if !visited.insert(next.clone()) {
                break;
            }
            successors = graph.successors(&next);
            chain.push(next);
        }

        Ok(chain)
    }

    /// Returns `true` if `source` can be routed to `sink`.
    pub fn path_exists_between(&self, source: &str, sink: &str) -> bool {
        self.current().paths(sink).is_reachable(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Connections;
    use serde_json::json;

    fn router() -> Router {
        Router::builder()
            .connections(
                Connections::new()
                    .device("Display_1", json!({ "hdmi": "Switcher_1__1", "hdmi2": "Decoder_1" }))
                    .device("Display_2", json!({ "hdmi": "Switcher_1__2" }))
                    .device("Display_3", json!({ "hdmi": "Scaler_1" }))
                    .device("Scaler_1", json!({ "in": "Decoder_2" }))
                    .device("Decoder_2", json!({ "net": "Encoder_1" }))
                    .device("Encoder_1", json!(["Camera_1", "Camera_2"]))
                    .device("Switcher_1", json!(["Laptop_1", "Laptop_2", "Decoder_1"])),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_input_for_with_sink() {
        let router = router();
        assert_eq!(
            router.input_for("Laptop_2", Some("Display_2")).unwrap(),
            Selector::parse("hdmi")
        );
        // The matrix hop nearest the source selects input 2.
        let route = router.route("Laptop_2", "Display_2").unwrap();
        assert_eq!(route.edges[0].input, Selector::Index(2));
        assert_eq!(
            router.input_for("Laptop_2", Some("Display_1")).unwrap(),
            Selector::parse("hdmi")
        );
    }

    #[test]
    fn test_input_for_single_device() {
        let router = router();
        // Laptop_1 feeds two facets of Switcher_1, both on input 1.
        assert_eq!(router.input_for("Laptop_1", None).unwrap(), Selector::Index(1));
        assert_eq!(router.input_for("Camera_2", None).unwrap(), Selector::Index(2));
    }

    #[test]
    fn test_input_for_ambiguous() {
        let router = router();
        // Decoder_1 feeds Display_1 directly and Switcher_1.
        let err = router.input_for("Decoder_1", None).unwrap_err();
        assert!(matches!(err, RouterError::AmbiguousSource { .. }));
        assert!(err.to_string().contains("please specify a sink"));
    }

    #[test]
    fn test_input_for_unknown() {
        let router = router();
        assert!(matches!(
            router.input_for("Display_1", None),
            Err(RouterError::NoOutputs { .. })
        ));
        assert!(matches!(
            router.input_for("Camera_1", Some("Display_1")),
            Err(RouterError::NoRoute { .. })
        ));
    }

    #[test]
    fn test_device_for() {
        let router = router();
        assert_eq!(router.device_for("Camera_1").unwrap(), NodeId::new("Encoder_1"));
        assert!(matches!(
            router.device_for("Laptop_1"),
            Err(RouterError::NotAnInputNode { .. })
        ));
        assert!(matches!(
            router.device_for("Display_2"),
            Err(RouterError::NoOutputs { .. })
        ));
    }

    #[test]
    fn test_devices_between() {
        let router = router();
        assert_eq!(
            router.devices_between("Camera_1", "Display_3").unwrap(),
            vec![
                NodeId::new("Encoder_1"),
                NodeId::new("Decoder_2"),
                NodeId::new("Scaler_1"),
                NodeId::new("Display_3"),
            ]
        );
        assert!(router.devices_between("Camera_1", "Display_1").is_err());
    }

    #[test]
    fn test_upstream_devices_of() {
        let router = router();
        assert_eq!(
            router.upstream_devices_of("Display_3", None).unwrap(),
            vec![
                NodeId::new("Scaler_1"),
                NodeId::new("Decoder_2"),
                NodeId::new("Encoder_1"),
            ]
        );

        // Several inputs and no input named.
        assert!(router.upstream_devices_of("Display_1", None).unwrap().is_empty());

        assert_eq!(
            router
                .upstream_devices_of("Display_1", Some(&Selector::parse("hdmi2")))
                .unwrap(),
            vec![NodeId::new("Decoder_1")]
        );
    }

    #[test]
    fn test_upstream_devices_of_errors() {
        let router = router();
        assert!(matches!(
            router.upstream_devices_of("Display_9", None),
            Err(RouterError::UnknownNode { .. })
        ));
        assert!(matches!(
            router.upstream_devices_of("Display_1", Some(&Selector::parse("vga"))),
            Err(RouterError::UnknownInput { .. })
        ));
    }

    #[test]
    fn test_path_exists_between() {
        let router = router();
        assert!(router.path_exists_between("Laptop_1", "Display_1"));
        assert!(router.path_exists_between("Camera_2", "Display_3"));
        assert!(!router.path_exists_between("Camera_2", "Display_1"));
        assert!(!router.path_exists_between("Laptop_1", "Display_9"));
    }
}
