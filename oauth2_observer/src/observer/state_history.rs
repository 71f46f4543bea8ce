use std::collections::{HashMap, VecDeque};

/// How the CSRF-state check treats the `state` of a new authorization request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StateComparison {
    /// Only compare the returned `state` against the one sent.
    #[default]
    Exact,
    /// Additionally flag a `state` too similar to one the same client used before.
    ReuseDetection {
        prior_states: Vec<String>,
        threshold: f64,
    },
}

/// Recent `state` values per client origin, bounded and session scoped.
#[derive(Debug, Clone)]
pub struct StateHistory {
    per_client: usize,
    states: HashMap<String, VecDeque<String>>,
}

impl StateHistory {
    pub fn new(per_client: usize) -> Self {
        Self {
            per_client: per_client.max(1),
            states: HashMap::new(),
        }
    }

    pub fn record(&mut self, client: &str, state: &str) {
        let states = self.states.entry(client.to_string()).or_default();
        if states.len() == self.per_client {
            states.pop_front();
        }
        states.push_back(state.to_string());
    }

    /// States previously recorded for `client`, oldest first.
    pub fn prior_states(&self, client: &str) -> Vec<String> {
        self.states
            .get(client)
            .map(|states| states.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Sørensen–Dice coefficient over case-folded character bigrams.
///
/// Strings too short to have a bigram score 1.0 when equal and 0.0 otherwise.
pub fn dice_coefficient(a: &str, b: &str) -> f64 {
    let (a_folded, b_folded) = (a.to_lowercase(), b.to_lowercase());
    let a = bigrams(&a_folded);
    let b = bigrams(&b_folded);

    match (a.as_slice(), b.as_slice()) {
        ([], []) if a_folded == b_folded => 1.0,
        ([], []) => 0.0,
        ([], _) | (_, []) => 0.0,
        _ => {
            let mut remaining = b.clone();
            let mut shared = 0usize;
            for pair in &a {
                if let Some(index) = remaining.iter().position(|p| p == pair) {
                    remaining.swap_remove(index);
                    shared += 1;
                }
            }
            (2 * shared) as f64 / (a.len() + b.len()) as f64
        }
    }
}

fn bigrams(folded: &str) -> Vec<(char, char)> {
    let chars = folded.chars().collect::<Vec<_>>();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}
