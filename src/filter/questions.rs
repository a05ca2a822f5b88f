use rand::seq::SliceRandom;
use rand::Rng;

use super::types::QuestionQuery;
use crate::database::models::Question;

/// Questions matching the category and the case-insensitive search over
/// question and answer text. Relative order is preserved.
pub fn filter_questions(questions: &[Question], query: &QuestionQuery) -> Vec<Question> {
    let needle = query.needle();

    questions
        .iter()
        .filter(|q| query.category.matches(&q.category))
        .filter(|q| match &needle {
            Some(needle) => {
                q.question.to_lowercase().contains(needle) || q.answer.to_lowercase().contains(needle)
            }
            None => true,
        })
        .cloned()
        .collect()
}

/// In-place Fisher-Yates shuffle. Only called when the user asks for one.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    items.shuffle(rng);
}

/// Distinct categories in first-seen order
pub fn categories(questions: &[Question]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for q in questions {
        if !seen.iter().any(|c| c == &q.category) {
            seen.push(q.category.clone());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::CategoryFilter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn q(id: i64, question: &str, answer: &str, category: &str) -> Question {
        Question {
            id,
            question: question.into(),
            answer: answer.into(),
            category: category.into(),
        }
    }

    fn bank() -> Vec<Question> {
        vec![
            q(1, "What is a SIEM?", "Log correlation platform", "SOC"),
            q(2, "Explain SSO", "Single sign-on across apps", "IAM"),
            q(3, "Triage an alert", "Check the SIEM timeline first", "SOC"),
            q(4, "What is MFA?", "Multiple factors", "IAM"),
            q(5, "Escalation paths", "Tier 1 to tier 2", "SOC"),
        ]
    }

    fn ids(questions: &[Question]) -> Vec<i64> {
        questions.iter().map(|q| q.id).collect()
    }

    #[test]
    fn category_and_search_intersect_in_original_order() {
        let query = QuestionQuery::new(CategoryFilter::Named("SOC".into()), Some("siem".into()));
        assert_eq!(ids(&filter_questions(&bank(), &query)), vec![1, 3]);

        // The same term under IAM matches nothing
        let query = QuestionQuery::new(CategoryFilter::Named("IAM".into()), Some("SIEM".into()));
        assert!(filter_questions(&bank(), &query).is_empty());
    }

    #[test]
    fn all_and_blank_search_keep_everything() {
        let query = QuestionQuery::new(CategoryFilter::All, Some("   ".into()));
        assert_eq!(ids(&filter_questions(&bank(), &query)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn search_covers_answers() {
        let query = QuestionQuery::new(CategoryFilter::All, Some("sign-on".into()));
        assert_eq!(ids(&filter_questions(&bank(), &query)), vec![2]);
    }

    #[test]
    fn category_match_is_exact() {
        let query = QuestionQuery::new(CategoryFilter::Named("soc".into()), None);
        assert!(filter_questions(&bank(), &query).is_empty());
    }

    #[test]
    fn shuffle_keeps_members_and_is_seed_stable() {
        let mut a = bank();
        let mut b = bank();
        shuffle(&mut a, &mut StdRng::seed_from_u64(7));
        shuffle(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(ids(&a), ids(&b));

        let mut sorted = ids(&a);
        sorted.sort();
        assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn categories_in_first_seen_order() {
        assert_eq!(categories(&bank()), vec!["SOC".to_string(), "IAM".to_string()]);
    }
}
