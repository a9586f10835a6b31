#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Three questions scored 12, 9 and 15, each with an accepted answer, plus
/// one answer that was not accepted.
pub const UNIX_POSTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<posts>
  <row Id="1" PostTypeId="1" AcceptedAnswerId="2" CreationDate="2019-05-01T10:00:00.000" Score="12" ViewCount="300" Body="&lt;p&gt;How do I follow a growing log?&lt;/p&gt;" OwnerUserId="42" LastActivityDate="2020-01-02T03:04:05.678" Title="Follow a log file" Tags="&lt;bash&gt;&lt;tail&gt;" AnswerCount="1" CommentCount="0" />
  <row Id="2" PostTypeId="2" ParentId="1" CreationDate="2019-05-01T11:00:00.000" Score="20" Body="&lt;p&gt;Use tail -f&lt;/p&gt;" OwnerUserId="7" OwnerDisplayName="alice" CommentCount="0" />
  <row Id="3" PostTypeId="1" AcceptedAnswerId="4" CreationDate="2019-06-01T10:00:00.000" Score="9" ViewCount="12" Body="&lt;p&gt;Hidden files?&lt;/p&gt;" OwnerUserId="43" LastActivityDate="2019-06-02T00:00:00.000" Title="List hidden files" Tags="&lt;ls&gt;" AnswerCount="1" CommentCount="2" />
  <row Id="4" PostTypeId="2" ParentId="3" CreationDate="2019-06-01T11:00:00.000" Score="1" Body="&lt;p&gt;Use ls -la&lt;/p&gt;" OwnerUserId="8" CommentCount="0" />
  <row Id="5" PostTypeId="1" AcceptedAnswerId="6" CreationDate="2019-07-01T10:00:00.000" Score="15" Body="&lt;p&gt;Two files differ?&lt;/p&gt;" OwnerUserId="9" OwnerDisplayName="bob" LastActivityDate="2019-07-03T00:00:00.000" Title="Compare two files" Tags="&lt;diff&gt;" AnswerCount="2" CommentCount="1" />
  <row Id="6" PostTypeId="2" ParentId="5" CreationDate="2019-07-01T11:00:00.000" Score="11" Body="&lt;p&gt;Use diff&lt;/p&gt;" OwnerUserId="10" CommentCount="0" />
  <row Id="7" PostTypeId="2" ParentId="5" CreationDate="2019-07-01T12:00:00.000" Score="2" Body="&lt;p&gt;Use cmp&lt;/p&gt;" OwnerUserId="11" CommentCount="0" />
</posts>
"#;

/// One qualifying pair.
pub const AI_POSTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<posts>
  <row Id="10" PostTypeId="1" AcceptedAnswerId="11" CreationDate="2018-01-01T00:00:00.000" Score="30" Body="&lt;p&gt;What is a perceptron?&lt;/p&gt;" OwnerUserId="1" OwnerDisplayName="carol" LastActivityDate="2018-02-01T00:00:00.000" Title="What is a perceptron" Tags="&lt;neural-networks&gt;" AnswerCount="1" CommentCount="0" />
  <row Id="11" PostTypeId="2" ParentId="10" CreationDate="2018-01-02T00:00:00.000" Score="25" Body="&lt;p&gt;A linear classifier.&lt;/p&gt;" OwnerUserId="2" CommentCount="0" />
</posts>
"#;

/// Qualifying questions whose accepted answers are empty or missing.
pub const DBA_POSTS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<posts>
  <row Id="20" PostTypeId="1" AcceptedAnswerId="21" Score="40" OwnerUserId="3" Title="Empty answer" Tags="&lt;sql&gt;" />
  <row Id="21" PostTypeId="2" ParentId="20" Score="5" Body="" OwnerUserId="4" />
  <row Id="22" PostTypeId="1" AcceptedAnswerId="99" Score="40" OwnerUserId="3" Title="Answer never posted" Tags="" />
  <row Id="23" PostTypeId="1" AcceptedAnswerId="24" Score="10" OwnerUserId="5" Title="Vacuum a table" />
  <row Id="24" PostTypeId="2" ParentId="23" Score="5" Body="&lt;p&gt;Run VACUUM&lt;/p&gt;" OwnerUserId="6" OwnerDisplayName="dave" />
</posts>
"#;

/// Write `content` as `<base>/<source>/Posts.xml`.
pub fn write_posts(base: &Path, source: &str, content: &str) -> PathBuf {
    let dir = base.join(source);
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("Posts.xml");
    fs::write(&path, content).unwrap();
    path
}
