use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Branching pre-order chatter for a customer. The core only validates the
/// shape at stage load; walking the graph belongs to the presentation
/// layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueGraph {
    pub nodes: Vec<DialogueNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: String,
    pub speaker: String,
    pub text: String,
    #[serde(default)]
    pub sprite: Option<String>,
    #[serde(default)]
    pub choices: Vec<DialogueChoice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueChoice {
    pub label: String,
    pub next: DialogueNext,
}

/// Where a choice leads: another node, or the terminal sentinel that hands
/// control back to the order flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueNext {
    End,
    Node(String),
}

impl DialogueGraph {
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Rejects duplicate node ids and choices that reference unknown nodes.
    pub fn validate(&self) -> Result<(), String> {
        let mut known_ids = HashSet::with_capacity(self.nodes.len());
        for node in &self.nodes {
            if !known_ids.insert(node.id.as_str()) {
                return Err(format!("duplicate node id '{}'", node.id));
            }
        }
        for node in &self.nodes {
            for choice in &node.choices {
                if let DialogueNext::Node(target) = &choice.next {
                    if !known_ids.contains(target.as_str()) {
                        return Err(format!(
                            "node '{}' choice '{}' references unknown node '{}'",
                            node.id, choice.label, target
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, choices: Vec<DialogueChoice>) -> DialogueNode {
        DialogueNode {
            id: id.to_string(),
            speaker: "customer".to_string(),
            text: format!("line for {id}"),
            sprite: None,
            choices,
        }
    }

    fn choice(label: &str, next: DialogueNext) -> DialogueChoice {
        DialogueChoice {
            label: label.to_string(),
            next,
        }
    }

    #[test]
    fn graph_with_resolvable_choices_validates() {
        let graph = DialogueGraph {
            nodes: vec![
                node(
                    "greet",
                    vec![
                        choice("ask", DialogueNext::Node("detail".to_string())),
                        choice("skip", DialogueNext::End),
                    ],
                ),
                node("detail", vec![choice("done", DialogueNext::End)]),
            ],
        };
        assert_eq!(graph.validate(), Ok(()));
        assert!(graph.node("detail").is_some());
        assert!(graph.node("missing").is_none());
    }

    #[test]
    fn duplicate_node_ids_are_rejected() {
        let graph = DialogueGraph {
            nodes: vec![node("greet", Vec::new()), node("greet", Vec::new())],
        };
        let error = graph.validate().expect_err("duplicate ids");
        assert!(error.contains("duplicate node id 'greet'"), "{error}");
    }

    #[test]
    fn dangling_choice_target_is_rejected() {
        let graph = DialogueGraph {
            nodes: vec![node(
                "greet",
                vec![choice("ask", DialogueNext::Node("nowhere".to_string()))],
            )],
        };
        let error = graph.validate().expect_err("dangling target");
        assert!(error.contains("unknown node 'nowhere'"), "{error}");
    }

    #[test]
    fn terminal_sentinel_parses_from_authored_json() {
        let raw = r#"{
            "id": "greet",
            "speaker": "customer",
            "text": "Morning!",
            "choices": [
                { "label": "Morning.", "next": "end" },
                { "label": "What can I get you?", "next": { "node": "order" } }
            ]
        }"#;
        let parsed: DialogueNode = serde_json::from_str(raw).expect("node");
        assert_eq!(parsed.choices[0].next, DialogueNext::End);
        assert_eq!(
            parsed.choices[1].next,
            DialogueNext::Node("order".to_string())
        );
    }
}
