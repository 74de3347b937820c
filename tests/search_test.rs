use std::collections::BTreeSet;

use generalized_suffix_index::{
    DocId, GeneralizedSuffixTree, IdPolicy, TreeConfig, TreeError, RESERVED_SYMBOLS_START, ROOT,
};

fn build(texts: &[(&str, DocId)]) -> GeneralizedSuffixTree {
    let mut tree = GeneralizedSuffixTree::new();
    for &(text, doc) in texts {
        tree.insert(text, doc).unwrap();
    }
    tree.check_invariants().unwrap();
    tree
}

#[test]
fn documents_sharing_a_substring() {
    let tree = build(&[("cacao", 0), ("banana", 1)]);
    assert_eq!(tree.search("ana"), vec![1]);
    assert_eq!(tree.search("a"), vec![0, 1]);
    assert_eq!(tree.search("ca"), vec![0]);
    assert!(tree.search("xyz").is_empty());
    assert!(tree.search("cacaob").is_empty());
    assert_eq!(tree.search(""), vec![0, 1]);
}

#[test]
fn repeated_prefix_within_one_document() {
    let tree = build(&[("abcabxabcd", 0)]);
    assert_eq!(tree.search("abc"), vec![0]);
    assert_eq!(tree.search_count("abc"), 1);
    assert_eq!(tree.search("ab"), vec![0]);
    assert_eq!(tree.search("abcd"), vec![0]);
    assert!(tree.search("abcx").is_empty());
}

#[test]
fn text_contained_in_another() {
    let tree = build(&[("aaa", 0), ("aa", 1)]);
    assert_eq!(tree.search("a"), vec![0, 1]);
    assert_eq!(tree.search("aa"), vec![0, 1]);
    assert_eq!(tree.search("aaa"), vec![0]);
    assert!(tree.search("aaaa").is_empty());
    assert_eq!(tree.search_count("aaaa"), 0);
}

#[test]
fn count_matches_search_for_every_substring() {
    let texts = [("mississippi", 0), ("missouri", 2), ("sip", 3), ("pip", 7)];
    let tree = build(&texts);
    for &(text, _) in &texts {
        let chars: Vec<char> = text.chars().collect();
        for i in 0..chars.len() {
            for j in i + 1..=chars.len() {
                let pattern: String = chars[i..j].iter().collect();
                let expected: Vec<DocId> = texts
                    .iter()
                    .filter(|(t, _)| t.contains(pattern.as_str()))
                    .map(|&(_, doc)| doc)
                    .collect();
                assert_eq!(tree.search(&pattern), expected, "pattern {:?}", pattern);
                assert_eq!(tree.search_count(&pattern), expected.len());
            }
        }
    }
}

#[test]
fn node_sets_agree_with_subtree_walk() {
    let tree = build(&[("xabxa", 0), ("babxba", 1), ("abab", 2), ("", 3)]);
    let root: Vec<DocId> = tree.fetch_index_set(ROOT).into_iter().collect();
    assert_eq!(root, tree.node(ROOT).index_set());
    assert_eq!(root, vec![0, 1, 2, 3]);

    for id in tree.nodes() {
        let node = tree.node(id);
        let subtree = tree.fetch_index_set(id);
        let own: BTreeSet<DocId> = node.index_set().iter().copied().collect();
        assert!(subtree.is_superset(&own));
        assert_eq!(subtree, own, "node {:?}", tree.node_string(id));
        assert_eq!(tree.compute_count(id), node.index_set().len());
        if node.is_leaf() {
            assert_eq!(node.index_set().len(), 1);
        }
    }
}

#[test]
fn node_text_matches_depth_and_suffix_links() {
    let texts = ["abcabxabcd", "xabcab", "dabca"];
    let mut tree = GeneralizedSuffixTree::new();
    for (doc, text) in texts.iter().enumerate() {
        tree.insert(text, doc as DocId).unwrap();
    }

    for id in tree.nodes() {
        let node = tree.node(id);
        let path = tree.node_text(id);
        assert_eq!(path.len() as u32, node.substring_length());
        if id == ROOT || node.is_leaf() {
            continue;
        }
        let text = tree.node_string(id);
        assert!(texts.iter().any(|t| t.contains(text.as_str())), "{:?}", text);

        let link = node.suffix().expect("internal nodes are linked");
        assert_eq!(tree.node_text(link), path[1..].to_vec());
        let parent = tree.source_node(id).expect("non-root nodes have a parent");
        assert!(tree.node(parent).substring_length() < node.substring_length());
    }
}

#[test]
fn nodes_by_depth_is_shallow_first() {
    let tree = build(&[("banana", 0), ("bandana", 1)]);
    let order = tree.nodes_by_depth();
    assert_eq!(order.len(), tree.node_count());
    assert_eq!(order[0], ROOT);
    assert!(order
        .windows(2)
        .all(|w| tree.node(w[0]).substring_length() <= tree.node(w[1]).substring_length()));
}

#[test]
fn reinserting_the_last_document_changes_nothing() {
    let mut tree = build(&[("cacao", 0), ("banana", 1)]);
    let patterns = ["a", "an", "ana", "ca", "cao", "b", "nan", "x"];
    let before: Vec<Vec<DocId>> = patterns.iter().map(|p| tree.search(p)).collect();

    tree.insert("banana", 1).unwrap();
    tree.check_invariants().unwrap();
    let after: Vec<Vec<DocId>> = patterns.iter().map(|p| tree.search(p)).collect();
    assert_eq!(before, after);
    assert_eq!(tree.document_count(), 2);
    assert_eq!(tree.text_count(), 3);
}

#[test]
fn one_document_spanning_several_texts() {
    let tree = build(&[("red", 0), ("green", 1), ("blue", 1)]);
    assert_eq!(tree.search("e"), vec![0, 1]);
    assert_eq!(tree.search("lu"), vec![1]);
    assert_eq!(tree.search("gre"), vec![1]);
    assert!(tree.search("eb").is_empty());
    assert_eq!(tree.text_document(2), Some(1));
    assert_eq!(tree.document_count(), 2);
}

#[test]
fn out_of_order_ids_are_rejected() {
    let mut tree = build(&[("alpha", 4)]);
    let err = tree.insert("beta", 2).unwrap_err();
    assert_eq!(err, TreeError::DocIdOutOfOrder { doc: 2, last: 4 });
    assert!(err.is_invalid_input());
    assert!(tree.search("beta").is_empty());
    assert_eq!(tree.text_count(), 1);
}

#[test]
fn strict_policy_rejects_repeated_ids() {
    let config = TreeConfig::new().id_policy(IdPolicy::Strict).capacity_hint(64);
    let mut tree = GeneralizedSuffixTree::with_config(config);
    tree.insert("one", 0).unwrap();
    assert_eq!(tree.insert("two", 0), Err(TreeError::DuplicateDocId(0)));
    tree.insert("two", 1).unwrap();
    assert_eq!(tree.search("o"), vec![0, 1]);
    assert_eq!(tree.config().id_policy, IdPolicy::Strict);
}

#[test]
fn reserved_symbols_never_match() {
    let mut tree = GeneralizedSuffixTree::new();
    tree.insert_symbols(&[5, 6, 7], 0).unwrap();
    assert_eq!(tree.search_symbols(&[6, 7]), vec![0]);
    assert!(tree.search_symbols(&[7, u64::MAX]).is_empty());
    assert_eq!(tree.search_count_symbols(&[u64::MAX]), 0);
    assert!(matches!(
        tree.insert_symbols(&[1, RESERVED_SYMBOLS_START + 1], 1),
        Err(TreeError::ReservedSymbol { position: 1, .. })
    ));
}

#[test]
fn empty_tree_answers_nothing() {
    let tree = GeneralizedSuffixTree::new();
    assert!(tree.search("").is_empty());
    assert!(tree.search("a").is_empty());
    assert_eq!(tree.search_count(""), 0);
    assert!(tree.longest_common_substring_all().is_empty());
    assert_eq!(tree.node_count(), 1);
    tree.check_invariants().unwrap();
}

#[test]
fn unicode_texts_round_trip_through_node_strings() {
    let tree = build(&[("größe", 0), ("straße", 1)]);
    assert_eq!(tree.search("ße"), vec![0, 1]);
    assert_eq!(tree.search("ö"), vec![0]);
    let common: String = tree
        .longest_common_substring_all()
        .into_iter()
        .filter_map(|s| char::from_u32(s as u32))
        .collect();
    assert_eq!(common, "ße");
}
