use rand::Rng;

const STATE_SUFFIX_LEN: usize = 13;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque `state` value: the configured prefix followed by random base-36
/// characters.
pub(crate) fn generate_state(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut state = String::with_capacity(prefix.len() + STATE_SUFFIX_LEN);
    state.push_str(prefix);
    state.extend((0..STATE_SUFFIX_LEN).map(|_| BASE36[rng.random_range(0..BASE36.len())] as char));
    state
}

#[cfg(test)]
mod tests {
    use super::generate_state;

    #[test]
    fn state_carries_prefix_and_base36_suffix() {
        let state = generate_state("stockx-auth-");
        let suffix = state.strip_prefix("stockx-auth-").unwrap();
        assert_eq!(suffix.len(), 13);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        );
    }

    #[test]
    fn consecutive_states_differ() {
        assert_ne!(generate_state("p-"), generate_state("p-"));
    }
}
