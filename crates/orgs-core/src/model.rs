//! Immutable snapshot of the live organization

use serde::Serialize;

/// A member account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// A deployed service control policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Policy {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A live organizational unit and everything directly inside it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OuNode {
    pub id: String,
    pub name: String,
    /// `None` for the root
    pub parent_id: Option<String>,
    /// Names of member accounts, sorted
    pub accounts: Vec<String>,
    /// Names of attached policies, sorted
    pub policies: Vec<String>,
    pub children: Vec<OuNode>,
}

impl OuNode {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn child(&self, name: &str) -> Option<&OuNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Visit this node and every descendant, parents before children.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a OuNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}

/// Point-in-time view of the organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrgSnapshot {
    pub root_id: String,
    pub accounts: Vec<Account>,
    pub policies: Vec<Policy>,
    pub tree: OuNode,
}

impl OrgSnapshot {
    pub fn account(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    pub fn policy(&self, name: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.name == name)
    }

    /// Every OU in the tree, root first
    pub fn ous(&self) -> Vec<&OuNode> {
        let mut nodes = Vec::new();
        self.tree.walk(&mut |ou| nodes.push(ou));
        nodes
    }

    pub fn find_ou(&self, id: &str) -> Option<&OuNode> {
        self.ous().into_iter().find(|ou| ou.id == id)
    }

    /// First OU with the given name, in tree order
    pub fn find_ou_by_name(&self, name: &str) -> Option<&OuNode> {
        self.ous().into_iter().find(|ou| ou.name == name)
    }

    /// Every OU with the given name, in tree order
    pub fn find_ous_by_name(&self, name: &str) -> Vec<&OuNode> {
        self.ous().into_iter().filter(|ou| ou.name == name).collect()
    }

    /// Id of the OU that directly contains the named account
    pub fn parent_of_account(&self, account: &str) -> Option<&str> {
        self.ous()
            .into_iter()
            .find(|ou| ou.accounts.iter().any(|a| a == account))
            .map(|ou| ou.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, name: &str, parent: Option<&str>, accounts: &[&str]) -> OuNode {
        OuNode {
            id: id.to_string(),
            name: name.to_string(),
            parent_id: parent.map(String::from),
            accounts: accounts.iter().map(|a| a.to_string()).collect(),
            policies: Vec::new(),
            children: Vec::new(),
        }
    }

    fn snapshot() -> OrgSnapshot {
        let mut root = node("r-1", "root", None, &["master"]);
        let mut eng = node("ou-1", "Engineering", Some("r-1"), &["svc-a"]);
        eng.children.push(node("ou-2", "Platform", Some("ou-1"), &[]));
        root.children.push(eng);
        OrgSnapshot {
            root_id: "r-1".to_string(),
            accounts: Vec::new(),
            policies: Vec::new(),
            tree: root,
        }
    }

    #[test]
    fn test_ous_in_tree_order() {
        let snap = snapshot();
        let names: Vec<&str> = snap.ous().iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["root", "Engineering", "Platform"]);
    }

    #[test]
    fn test_parent_of_account() {
        let snap = snapshot();
        assert_eq!(snap.parent_of_account("svc-a"), Some("ou-1"));
        assert_eq!(snap.parent_of_account("master"), Some("r-1"));
        assert_eq!(snap.parent_of_account("ghost"), None);
    }

    #[test]
    fn test_find_ou() {
        let snap = snapshot();
        assert_eq!(snap.find_ou("ou-2").unwrap().name, "Platform");
        assert!(snap.find_ou_by_name("root").unwrap().is_root());
        assert_eq!(snap.find_ous_by_name("Platform").len(), 1);
        assert!(snap.find_ous_by_name("Sandbox").is_empty());
        assert!(snap.tree.child("Engineering").is_some());
    }
}
