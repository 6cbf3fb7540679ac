use folio_docs::content::{
    code_block_invocation, unescape_template, CodeFenceRewriter, ContentError, ContentFetcher,
    ContentPipeline, DocumentSerializer, FenceRewriter,
};
use folio_docs::models::*;
use folio_docs::render::{extract_toc, slugify, DocumentRenderer};
use speculate2::speculate;

fn code_blocks(doc: &SerializedDocument) -> Vec<&CodeSample> {
    doc.tree
        .children
        .iter()
        .filter_map(|node| match node {
            Node::CodeBlock(sample) => Some(sample),
            _ => None,
        })
        .collect()
}

speculate! {
    before {
        let dir = tempfile::tempdir().expect("Failed to create content root");
        let fetcher = ContentFetcher::new(dir.path()).expect("Failed to open content root");
        let pipeline = ContentPipeline::new(fetcher);
        let serializer = DocumentSerializer::new();
    }

    describe "fence rewriting" {
        it "rewrites a bash fence without a filename" {
            let out = FenceRewriter.rewrite("```bash\nls -la\n```\n");
            assert_eq!(out, "<CodeBlock code={`ls -la`} language=\"bash\" />\n");
            assert!(!out.contains("filename"));
        }

        it "defaults the language for untagged fences" {
            let out = FenceRewriter.rewrite("```\nplain\n```");
            assert_eq!(out, code_block_invocation("plain", "text", None));
        }

        it "keeps filename annotations" {
            let out = FenceRewriter.rewrite("```ts filename=\"app.ts\"\nlet a = 1;\n```");
            assert_eq!(out, "<CodeBlock code={`let a = 1;`} language=\"ts\" filename=\"app.ts\" />");
        }

        it "recovers bodies with backticks and interpolation exactly" {
            let bodies = [
                "const s = `hello ${name}`;",
                "echo \"$HOME\" \\\n  && ls",
                "a \\` b \\$ c",
                "``` not a fence in the middle",
            ];
            for body in bodies {
                let text = format!("```js\n{body}\n```\n");
                let doc = serializer.serialize("sample.md", &text).expect("serializes");
                let blocks = code_blocks(&doc);
                assert_eq!(blocks.len(), 1, "{body}");
                assert_eq!(blocks[0].code, body);
                assert_eq!(blocks[0].language, "js");
                assert!(!doc.recovered, "{body}");
            }
        }

        it "escapes template breakers in the invocation" {
            let out = code_block_invocation("`${x}`", "js", None);
            assert!(out.contains("\\`\\${x}\\`"));
            assert_eq!(unescape_template("\\`\\${x}\\`"), "`${x}`");
        }
    }

    describe "serialization" {
        it "takes the title from the first level-one heading" {
            let doc = serializer.serialize("guide.md", "Intro text\n\n# The Guide\n\n# Second").unwrap();
            assert_eq!(doc.title, "The Guide");
        }

        it "falls back to the identifier without a heading" {
            let doc = serializer.serialize("guide.md", "## Only a subheading\n").unwrap();
            assert_eq!(doc.title, "guide.md");
        }

        it "carries frontmatter into the tree" {
            let doc = serializer
                .serialize("guide.md", "---\ntitle: Guide\ntags: [a, b]\n---\n# Guide\n")
                .unwrap();
            assert_eq!(doc.tree.frontmatter["title"], "Guide");
            assert_eq!(doc.tree.frontmatter["tags"][1], "b");
        }

        it "recovers from a malformed embedded block" {
            let text = "# Broken\n\n```js my\"file.js\nconsole.log(1);\n```\n";
            let doc = serializer.serialize("broken.md", text).expect("fallback succeeds");

            assert!(doc.recovered);
            assert_eq!(doc.content, text);
            let blocks = code_blocks(&doc);
            assert_eq!(blocks[0].code, "console.log(1);");
            assert_eq!(blocks[0].filename, None);
        }

        it "keeps code samples that show a closing tag inside a callout" {
            let text = "<Callout type=\"tip\">\nClose it with:\n\n```mdx filename=\"x.mdx\"\n</Callout>\n```\n</Callout>\n\nAfter\n";
            let doc = serializer.serialize("callout.md", text).unwrap();
            assert!(!doc.recovered);

            match &doc.tree.children[..] {
                [Node::Callout { children, .. }, Node::Paragraph { .. }] => match &children[1] {
                    Node::CodeBlock(sample) => {
                        assert_eq!(sample.code, "</Callout>");
                        assert_eq!(sample.filename.as_deref(), Some("x.mdx"));
                    }
                    other => panic!("unexpected child: {other:?}"),
                },
                other => panic!("unexpected tree: {other:?}"),
            }
        }

        it "fails when both attempts fail" {
            let result = serializer.serialize("bad.md", "---\n: [\n---\n# Bad\n");
            assert!(matches!(result, Err(ContentError::Serialization { .. })));
        }

        it "parses callouts and code tabs" {
            let text = "<Callout type=\"warning\" title=\"Careful\">\nMind the **gap**.\n</Callout>\n\n<CodeTabs>\n```bash filename=\"npm\"\nnpm i\n```\n```bash\nyarn\n```\n</CodeTabs>\n";
            let doc = serializer.serialize("tabs.md", text).unwrap();
            assert!(!doc.recovered);

            match &doc.tree.children[..] {
                [Node::Callout { kind, title, children }, Node::CodeTabs { tabs }] => {
                    assert_eq!(kind, "warning");
                    assert_eq!(title.as_deref(), Some("Careful"));
                    assert!(matches!(children[0], Node::Paragraph { .. }));
                    assert_eq!(tabs.len(), 2);
                    assert_eq!(tabs[0].filename.as_deref(), Some("npm"));
                    assert_eq!(tabs[1].code, "yarn");
                }
                other => panic!("unexpected tree: {other:?}"),
            }
        }
    }

    describe "pipeline" {
        it "rejects traversal before touching the disk" {
            for id in ["../secret.md", "../../etc/passwd", "a/../../b.md", "a/b/../../../c.md"] {
                assert!(matches!(pipeline.load(id), Err(ContentError::PathSecurity(_))), "{id}");
            }
        }

        it "reports missing files" {
            assert!(matches!(pipeline.load("missing.md"), Err(ContentError::FileNotFound(_))));
        }

        it "normalizes line endings" {
            std::fs::write(dir.path().join("crlf.md"), "# Windows\r\n\r\n```sh\r\necho hi\r\n```\r\n").unwrap();
            let doc = pipeline.load("crlf.md").unwrap();
            assert_eq!(doc.title, "Windows");
            assert_eq!(code_blocks(&doc)[0].code, "echo hi");
        }

        it "renders a loaded document with a table of contents" {
            std::fs::write(
                dir.path().join("guide.md"),
                "# Guide\n\n## Getting Started\n\n### Install the CLI\n\n## FAQ {#faq}\n\n##### Deep\n\n###### Deeper\n",
            ).unwrap();
            let doc = pipeline.load("guide.md").unwrap();
            let view = DocumentRenderer::new().render(&doc.tree);
            let toc = extract_toc(&view);

            let ids: Vec<&str> = toc.iter().map(|t| t.id.as_str()).collect();
            assert_eq!(ids, ["getting-started", "install-the-cli", "faq"]);
            assert_eq!(toc[2].text, "FAQ");
        }
    }

    describe "slugs" {
        it "are idempotent" {
            for text in ["Getting Started", "  C++ & Rust!  ", "Ünïcode heading", "a--b__c"] {
                let once = slugify(text);
                assert_eq!(slugify(&once), once);
            }
        }
    }
}
