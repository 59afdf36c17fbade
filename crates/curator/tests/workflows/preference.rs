use curator::preference::PreferenceSynthesizer;

use super::*;

#[tokio::test]
async fn test_synthesis_prompt_orders_prefix_liked_disliked() -> TestResult<()> {
  let store = MockStore::with_entries(vec![
    entry("p2", "P2", Some(1), Some("abstract about GUI design")),
    entry("p1", "P1", Some(5), Some("abstract about pruning")),
  ]);
  let scorer = MockScorer::new().with_text("You like efficient systems.");

  let synthesizer = PreferenceSynthesizer::new(&store, &scorer);
  let preference = synthesizer.synthesize("I like efficiency research").await?;
  assert_eq!(preference, "You like efficient systems.");

  let prompts = scorer.text_prompts();
  assert_eq!(prompts.len(), 1);
  let prompt = &prompts[0];
  let prefix = prompt.find("I like efficiency research").unwrap();
  let positive = prompt.find("abstract about pruning").unwrap();
  let negative = prompt.find("abstract about GUI design").unwrap();
  assert!(prefix < positive);
  assert!(positive < negative);
  Ok(())
}

#[tokio::test]
async fn test_synthesis_excludes_neutral_and_unrated() -> TestResult<()> {
  let store = MockStore::with_entries(vec![
    entry("a", "Liked", Some(4), Some("liked abstract")),
    entry("b", "Neutral", Some(3), Some("neutral abstract")),
    entry("c", "Unrated", None, Some("unrated abstract")),
    entry("d", "Disliked", Some(2), None),
  ]);
  let scorer = MockScorer::new().with_text("ok");

  let synthesizer = PreferenceSynthesizer::new(&store, &scorer);
  let (liked, disliked) = synthesizer.partition().await?;
  assert_eq!(liked.len(), 1);
  assert_eq!(liked[0].name, "Liked");
  assert_eq!(disliked.len(), 1);
  assert_eq!(disliked[0].abstract_text, "");

  synthesizer.synthesize("prefix").await?;
  let prompt = &scorer.text_prompts()[0];
  assert!(!prompt.contains("neutral abstract"));
  assert!(!prompt.contains("unrated abstract"));
  assert!(prompt.contains("Disliked: \n"));
  Ok(())
}

#[tokio::test]
async fn test_synthesis_retrieves_each_listed_entry() -> TestResult<()> {
  let store = MockStore::with_entries(vec![
    entry("a", "A", Some(5), Some("x")),
    entry("b", "B", None, None),
    entry("c", "C", Some(1), Some("y")),
  ]);
  let scorer = MockScorer::new().with_text("ok");

  PreferenceSynthesizer::new(&store, &scorer).synthesize("prefix").await?;
  assert_eq!(store.retrieved(), vec!["a", "b", "c"]);
  Ok(())
}

#[tokio::test]
async fn test_synthesis_propagates_model_failure() {
  let store = MockStore::with_entries(vec![entry("a", "A", Some(5), Some("x"))]);
  let scorer = MockScorer::new();

  let result = PreferenceSynthesizer::new(&store, &scorer).synthesize("prefix").await;
  assert!(matches!(result, Err(CuratorError::ApiError(_))));
}
