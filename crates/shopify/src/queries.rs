//! GraphQL documents sent to the Admin API.

pub(crate) const SEARCH_VARIANTS: &str = r#"
query searchVariantsBySku($query: String!, $first: Int!, $after: String) {
  productVariants(first: $first, after: $after, query: $query) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        sku
        inventoryItem {
          id
        }
      }
    }
  }
}
"#;

pub(crate) const GET_INVENTORY_LEVEL: &str = r#"
query getInventoryLevel($inventoryItemId: ID!) {
  inventoryItem(id: $inventoryItemId) {
    inventoryLevels(first: 5) {
      edges {
        node {
          location {
            id
          }
          quantities(names: ["available"]) {
            name
            quantity
          }
        }
      }
    }
  }
}
"#;

pub(crate) const SET_INVENTORY_QUANTITIES: &str = r#"
mutation inventorySetQuantities($input: InventorySetQuantitiesInput!) {
  inventorySetQuantities(input: $input) {
    inventoryAdjustmentGroup {
      changes {
        name
        delta
        quantityAfterChange
      }
    }
    userErrors {
      field
      code
      message
    }
  }
}
"#;

pub(crate) const GET_VARIANT_INVENTORY_ITEM: &str = r#"
query getVariant($id: ID!) {
  productVariant(id: $id) {
    inventoryItem {
      id
    }
  }
}
"#;

pub(crate) const FIND_VARIANT_BY_SKU: &str = r#"
query findVariant($query: String!) {
  productVariants(first: 1, query: $query) {
    pageInfo {
      hasNextPage
      endCursor
    }
    edges {
      node {
        id
        sku
        inventoryItem {
          id
        }
      }
    }
  }
}
"#;

pub(crate) const LIST_WEBHOOK_SUBSCRIPTIONS: &str = r#"
query webhookSubscriptions($first: Int!) {
  webhookSubscriptions(first: $first) {
    edges {
      node {
        id
        topic
        endpoint {
          __typename
          ... on WebhookHttpEndpoint {
            callbackUrl
          }
        }
      }
    }
  }
}
"#;

pub(crate) const DELETE_WEBHOOK_SUBSCRIPTION: &str = r#"
mutation webhookSubscriptionDelete($id: ID!) {
  webhookSubscriptionDelete(id: $id) {
    deletedWebhookSubscriptionId
    userErrors {
      field
      message
    }
  }
}
"#;

pub(crate) const CREATE_WEBHOOK_SUBSCRIPTION: &str = r#"
mutation webhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}
"#;
