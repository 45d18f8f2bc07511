//! Fixed prompt templates for the synthesis and critique steps.
//!
//! The critic template fixes the `"<Axis>: <score>/10"` format that
//! `critique::parse_critique` scans for. Changing that block changes what the
//! client can recover from the critique text.

use once_cell::sync::Lazy;

/// A named template with `{{name}}` placeholders.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Stable identifier (format: role-v1)
    pub id: &'static str,
    pub template: &'static str,
}

impl Prompt {
    /// Single-pass substitution; substituted values are never rescanned, so
    /// concept titles or model output containing `{{...}}` pass through verbatim.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        let mut out = String::with_capacity(self.template.len() + 256);
        let mut rest = self.template;
        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match vars.iter().find(|(k, _)| *k == key) {
                        Some((_, value)) => out.push_str(value),
                        None => out.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

pub static SYNTHESIZER: Lazy<Prompt> = Lazy::new(|| Prompt {
    id: "synthesizer-v1",
    template: "[SYSTEM]
You are a creative synthesizer. Your task is to find deep, non-obvious,
and potentially groundbreaking connections between the two following concepts.
Do not state the obvious. Generate a hypothesis, a novel analogy,
a potential research question, or a creative synthesis.
Be speculative but ground your reasoning.

Concept 1: {{concept1}}
Concept 2: {{concept2}}

Think step-by-step to explore potential connections:

#. Are these concepts analogous in some abstract way?
#. Could one concept be a metaphor for the other?
#. Do they represent a similar problem or solution in different domains?
#. Could they be combined to create a new idea or solve a problem?
#. What revealing contradiction or tension exists between them?

Synthesize your most interesting finding below.
[ASSISTANT]",
});

pub static CRITIC: Lazy<Prompt> = Lazy::new(|| Prompt {
    id: "critic-v1",
    template: "[SYSTEM]
You are a discerning critic. Evaluate the following hypothesis
on a scale of 1--10 for each of the following criteria:

- **Novelty:** Is this idea surprising and non-obvious? (1=obvious, 10=paradigm-shifting)
- **Coherence:** Is the reasoning logical and well-formed? (1=nonsense, 10=rigorous)
- **Usefulness:** Could this idea lead to a testable hypothesis, a new product,
  or a solution to a problem? (1=useless, 10=highly applicable)

Hypothesis: {{thought}}

First, provide your scores in the format:
Novelty: [score]/10
Coherence: [score]/10
Usefulness: [score]/10

Then, provide a brief justification for your scores.
[ASSISTANT]",
});

pub fn synthesis_prompt(first: &str, second: &str) -> String {
    SYNTHESIZER.render(&[("concept1", first), ("concept2", second)])
}

pub fn critique_prompt(thought: &str) -> String {
    CRITIC.render(&[("thought", thought)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthesis_prompt_names_both_concepts_in_order() {
        let p = synthesis_prompt("Jazz", "Mycelium");
        let a = p.find("Concept 1: Jazz").unwrap();
        let b = p.find("Concept 2: Mycelium").unwrap();
        assert!(a < b);
        assert!(!p.contains("{{"));
    }

    #[test]
    fn critique_prompt_carries_score_format() {
        let p = critique_prompt("Fungal networks route like bebop.");
        assert!(p.contains("Hypothesis: Fungal networks route like bebop."));
        for axis in ["Novelty: [score]/10", "Coherence: [score]/10", "Usefulness: [score]/10"] {
            assert!(p.contains(axis), "missing {axis}");
        }
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let p = synthesis_prompt("{{concept2}}", "Tides");
        assert!(p.contains("Concept 1: {{concept2}}"));
        assert!(p.contains("Concept 2: Tides"));
    }

    #[test]
    fn templates_have_distinct_ids() {
        assert_eq!(SYNTHESIZER.id, "synthesizer-v1");
        assert_eq!(CRITIC.id, "critic-v1");
    }

    #[test]
    fn unknown_placeholder_is_left_intact() {
        let prompt = Prompt {
            id: "t",
            template: "a {{missing}} b {{x}} c {{open",
        };
        assert_eq!(prompt.render(&[("x", "X")]), "a {{missing}} b X c {{open");
    }
}
