use crate::{
    constants::{CATEGORY_COL_NAME, DB_NAME, SUBSCRIPTION_COL_NAME, TICKET_COL_NAME, USER_COL_NAME},
    models::{
        category_model::Category, subscription_model::Subscription, ticket_model::Ticket,
        user_model::User,
    },
};
use mongodb::{
    Client, Collection, IndexModel,
    bson::doc,
    error::Error as MongoError,
    options::{ClientOptions, IndexOptions},
};

pub async fn connect_to_database(client_uri: &str) -> Result<Client, MongoError> {
    let mut client_options = ClientOptions::parse(client_uri).await?;
    client_options.app_name = Some("bi-portal-backend".to_string());
    Client::with_options(client_options)
}

pub async fn get_collection<T>(
    client: &Client,
    collection_name: &str,
) -> Result<Collection<T>, MongoError>
where
    T: serde::de::DeserializeOwned + serde::Serialize + Unpin + Send + Sync,
{
    Ok(client.database(&DB_NAME).collection::<T>(collection_name))
}

async fn create_partial_unique_index<T>(
    collection: &Collection<T>,
    field: &str,
) -> Result<(), MongoError>
where
    T: Send + Sync,
{
    let index = IndexModel::builder()
        .keys(doc! { field: 1 })
        .options(
            IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(doc! { field: { "$exists": true, "$type": "string" } })
                .build(),
        )
        .build();

    collection.create_index(index).await?;
    Ok(())
}

async fn create_lookup_index<T>(collection: &Collection<T>, field: &str) -> Result<(), MongoError>
where
    T: Send + Sync,
{
    let index = IndexModel::builder().keys(doc! { field: 1 }).build();
    collection.create_index(index).await?;
    Ok(())
}

pub async fn create_indexes(client: &Client) -> Result<(), MongoError> {
    let users = get_collection::<User>(client, &USER_COL_NAME).await?;
    create_partial_unique_index(&users, "email").await?;
    create_partial_unique_index(&users, "verification_token").await?;

    let categories = get_collection::<Category>(client, &CATEGORY_COL_NAME).await?;
    create_partial_unique_index(&categories, "name").await?;

    let subscriptions = get_collection::<Subscription>(client, &SUBSCRIPTION_COL_NAME).await?;
    create_partial_unique_index(&subscriptions, "stripe_subscription_id").await?;
    create_lookup_index(&subscriptions, "user_id").await?;

    let tickets = get_collection::<Ticket>(client, &TICKET_COL_NAME).await?;
    create_lookup_index(&tickets, "user_id").await?;

    Ok(())
}
