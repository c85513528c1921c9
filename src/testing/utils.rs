/// Distinct labels in order of first appearance
pub fn extract_unique_groups<S>(labels: &[S]) -> Vec<String>
where
    S: AsRef<str>,
{
    let mut unique_groups: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref();
        if !unique_groups.iter().any(|g| g == label) {
            unique_groups.push(label.to_string());
        }
    }
    unique_groups
}

/// Get indices for one group
pub fn get_group_indices<S>(labels: &[S], group: &str) -> Vec<usize>
where
    S: AsRef<str>,
{
    labels
        .iter()
        .enumerate()
        .filter_map(|(i, l)| if l.as_ref() == group { Some(i) } else { None })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_groups_keep_first_appearance() {
        let labels = ["tumor", "normal", "tumor", "glioma", "normal"];
        assert_eq!(
            extract_unique_groups(&labels),
            vec!["tumor", "normal", "glioma"]
        );
        assert_eq!(get_group_indices(&labels, "normal"), vec![1, 4]);
        assert!(get_group_indices(&labels, "absent").is_empty());
    }
}
