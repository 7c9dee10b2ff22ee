use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rs_chain_core::model::chain::Chain;
use rs_chain_core::text::is_end_of_sentence;

const CORPUS: &str = "It was the best of times, it was the worst of times. \
	It was the age of wisdom, it was the age of foolishness! \
	Was it the epoch of belief? It was the season of Light.";

fn trained(context_length: usize) -> Chain {
	let mut chain = Chain::new(context_length).unwrap();
	chain.build_str(CORPUS);
	chain
}

#[test]
fn prisoner_scenario() {
	let text = "I am not a number! I am a free man!";
	let vocabulary: Vec<&str> = text.split_whitespace().collect();
	let mut chain = Chain::new(2).unwrap();
	chain.build_str(text);

	let mut rng = StdRng::seed_from_u64(1967);
	let output = chain.generate("I am", 1, 10, &mut rng);

	assert!(output.starts_with("I am"));
	assert!(output.ends_with('!'));
	let appended: Vec<&str> = output.split_whitespace().skip(2).collect();
	assert!(appended.len() <= 10);
	assert!(appended.iter().all(|word| vocabulary.contains(word)));
}

#[test]
fn empty_seed_starts_a_text() {
	let mut chain = trained(2);
	let mut rng = StdRng::seed_from_u64(3);
	let output = chain.generate("", 1, 50, &mut rng);

	// Words after START are "It" and "Was"
	assert!(output.starts_with("It ") || output.starts_with("Was "), "{output}");
	assert!(is_end_of_sentence(&output), "{output}");
}

#[test]
fn stats_count_every_generated_word() {
	// No sentence ending, so nothing generated is cut off.
	let mut chain = Chain::new(3).unwrap();
	chain.build_str("the cat sat on the mat and the dog sat on the cat");
	let mut rng = StdRng::seed_from_u64(12);
	let output = chain.generate("the dog", 1, 30, &mut rng);

	let appended = output.split_whitespace().count() - 2;
	let stats = chain.stats();
	assert_eq!(appended, 30);
	assert_eq!(stats.len(), 4);
	assert_eq!(stats.iter().sum::<usize>(), appended);
}

proptest! {
	#[test]
	fn never_exceeds_max_words(
		seed in "[a-zA-Z ,.!?]{0,40}",
		sentences in 0usize..5,
		max_words in 0usize..40,
		rng_seed in any::<u64>(),
		context_length in 1usize..4,
	) {
		let mut chain = trained(context_length);
		let mut rng = StdRng::seed_from_u64(rng_seed);
		let output = chain.generate(&seed, sentences, max_words, &mut rng);

		let seed_words: Vec<&str> = seed.split_whitespace().collect();
		let output_words: Vec<&str> = output.split_whitespace().collect();
		prop_assert!(output_words.len() <= seed_words.len() + max_words);
		prop_assert_eq!(&output_words[..seed_words.len()], &seed_words[..]);
	}

	#[test]
	fn ends_on_sentence_when_one_was_reached(
		sentences in 1usize..4,
		max_words in 1usize..60,
		rng_seed in any::<u64>(),
	) {
		let mut chain = trained(2);
		let mut rng = StdRng::seed_from_u64(rng_seed);
		let output = chain.generate("it was", sentences, max_words, &mut rng);

		let appended: Vec<&str> = output.split_whitespace().skip(2).collect();
		if appended.iter().any(|word| is_end_of_sentence(word)) {
			prop_assert!(is_end_of_sentence(appended[appended.len() - 1]), "{}", output);
		}
	}

	#[test]
	fn same_rng_seed_same_output(rng_seed in any::<u64>(), max_words in 0usize..50) {
		let mut first = trained(2);
		let mut second = trained(2);
		let a = first.generate("the", 2, max_words, &mut StdRng::seed_from_u64(rng_seed));
		let b = second.generate("the", 2, max_words, &mut StdRng::seed_from_u64(rng_seed));
		prop_assert_eq!(a, b);
	}
}
